use crate::program::Program;
use crate::types::MachineError;

use std::sync::RwLock;

// Built-in programs
const PROGRAM_TEXTS: [&str; 2] = [
    include_str!("../programs/xb-oscillator.tur"),
    include_str!("../programs/unary-adder.tur"),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<Program>> = RwLock::new(Vec::new());
}

pub struct ProgramManager;

impl ProgramManager {
    /// Parses the built-in programs into the registry.
    pub fn load() -> Result<(), MachineError> {
        let mut programs = Vec::new();

        for (index, program_text) in PROGRAM_TEXTS.iter().enumerate() {
            match crate::parser::parse(program_text) {
                Ok(program) => programs.push(program),
                Err(e) => tracing::warn!(index, "Failed to parse built-in program: {}", e),
            }
        }

        let mut write_guard = PROGRAMS.write().map_err(|_| {
            MachineError::ValidationError("Failed to acquire write lock".to_string())
        })?;
        *write_guard = programs;

        Ok(())
    }

    /// Loads the registry on first use.
    fn ensure_loaded() {
        let empty = PROGRAMS.read().map(|p| p.is_empty()).unwrap_or(true);
        if empty {
            if let Err(e) = Self::load() {
                tracing::warn!("Failed to load built-in programs: {}", e);
            }
        }
    }

    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        Self::ensure_loaded();

        PROGRAMS.read().map(|programs| programs.len()).unwrap_or(0)
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, MachineError> {
        Self::ensure_loaded();

        PROGRAMS
            .read()
            .map_err(|_| MachineError::ValidationError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| {
                MachineError::ValidationError(format!("Program index {} out of range", index))
            })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, MachineError> {
        Self::ensure_loaded();

        PROGRAMS
            .read()
            .map_err(|_| MachineError::ValidationError("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|program| program.name == name)
            .cloned()
            .ok_or_else(|| MachineError::ValidationError(format!("Program '{}' not found", name)))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        Self::ensure_loaded();

        PROGRAMS
            .read()
            .map(|programs| {
                programs
                    .iter()
                    .map(|program| program.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, MachineError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            initial_state: program.initial_state.clone(),
            state_count: program.table.states().len(),
            transition_count: program.table.len(),
            steps: program.step_budget(),
        })
    }

    /// Get the original text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, MachineError> {
        PROGRAM_TEXTS.get(index).copied().ok_or_else(|| {
            MachineError::ValidationError(format!("Program text index {} out of range", index))
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub state_count: usize,
    pub transition_count: usize,
    pub steps: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TraceRenderer;

    #[test]
    fn test_program_manager_initialization() {
        assert!(ProgramManager::load().is_ok());
        assert_eq!(ProgramManager::get_program_count(), 2);
    }

    #[test]
    fn test_registry_loads_on_first_use() {
        ProgramManager::ensure_loaded();
        assert_eq!(PROGRAMS.read().unwrap().len(), 2);
    }

    #[test]
    fn test_program_names() {
        let names = ProgramManager::list_program_names();
        assert_eq!(names, vec!["X/B oscillator", "Unary adder"]);
    }

    #[test]
    fn test_program_manager_get_program_by_index() {
        assert!(ProgramManager::get_program_by_index(0).is_ok());
        assert!(ProgramManager::get_program_by_index(999).is_err());
        assert!(ProgramManager::get_program_text_by_index(1)
            .unwrap()
            .contains("Unary adder"));
        assert!(ProgramManager::get_program_text_by_index(2).is_err());
    }

    #[test]
    fn test_program_manager_get_program_by_name() {
        let program = ProgramManager::get_program_by_name("Unary adder").unwrap();
        assert_eq!(program.length, 16);
        assert_eq!(program.blank, '#');

        assert!(ProgramManager::get_program_by_name("Nonexistent").is_err());
    }

    #[test]
    fn test_program_manager_get_program_info() {
        let info = ProgramManager::get_program_info(1).unwrap();
        assert_eq!(info.index, 1);
        assert_eq!(info.initial_state, "s1");
        assert_eq!(info.state_count, 12);
        assert_eq!(info.transition_count, 16);
        assert_eq!(info.steps, 24);

        assert!(ProgramManager::get_program_info(999).is_err());
    }

    #[test]
    fn test_xb_oscillator_trace() {
        let program = ProgramManager::get_program_by_name("X/B oscillator").unwrap();
        let trace = TraceRenderer::default().render_all(program.run()).unwrap();

        let expected = [
            "  s1: BB", "      ^", "  s2: XB", "       ^", "  s3: XB", "      ^", "  s4: BB",
            "       ^", "  s1: BB", "      ^", "  s2: XB", "       ^", "  s3: XB", "      ^",
            "  s4: BB", "       ^",
        ];
        assert_eq!(trace.lines().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_unary_adder_trace() {
        let program = ProgramManager::get_program_by_name("Unary adder").unwrap();
        let trace = TraceRenderer::default().render_all(program.run()).unwrap();
        let lines: Vec<&str> = trace.lines().collect();

        assert_eq!(lines.len(), 48);
        assert_eq!(lines[0], "  s1: ################");
        assert_eq!(lines[1], "      ^");
        assert_eq!(lines[16], "  s9: (111+11)########");
        assert_eq!(lines[17], "              ^");
        assert_eq!(lines[26], " s10: (111111)########");
        assert_eq!(lines[27], "           ^");
        assert_eq!(lines[32], " s11: (111111#########");
        assert_eq!(lines[46], " s12: (11111)#########");
        assert_eq!(lines[47], "                   ^");

        let mut run = program.machine().run(24);
        run.by_ref().for_each(drop);
        assert_eq!(run.configuration().tape().to_string(), "(11111)#########");
    }

    #[test]
    fn test_programs_can_be_executed() {
        for i in 0..ProgramManager::get_program_count() {
            let program = ProgramManager::get_program_by_index(i).unwrap();
            let mut run = program.run();
            let steps = run.by_ref().collect::<Result<Vec<_>, _>>();

            assert!(steps.is_ok(), "Program '{}' failed: {:?}", program.name, steps);
            assert_eq!(steps.unwrap().len(), program.step_budget());
        }
    }
}
