use std::process::ExitCode;

use tmsim::{ProgramManager, TraceRenderer};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let renderer = TraceRenderer::default();
    let mut status = ExitCode::SUCCESS;

    for index in 0..ProgramManager::get_program_count() {
        let program = match ProgramManager::get_program_by_index(index) {
            Ok(program) => program,
            Err(e) => {
                tracing::error!("Failed to load program {}: {}", index, e);
                status = ExitCode::FAILURE;
                continue;
            }
        };

        tracing::info!(
            name = %program.name,
            steps = program.step_budget(),
            "Running program"
        );
        println!("{}", program.name);

        let mut run = program.run();
        for record in run.by_ref() {
            match record {
                Ok(record) => println!("{}", renderer.render_record(&record)),
                Err(e) => {
                    tracing::error!(name = %program.name, "Machine error: {}", e);
                    status = ExitCode::FAILURE;
                }
            }
        }

        if run.halted() {
            println!("Machine halted in state {}.", run.configuration().state());
        }
        println!();
    }

    status
}
