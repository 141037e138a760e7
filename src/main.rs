#![allow(non_snake_case)]
use deriva_engine::Utils::analysis_task::AnalysisTask;
use deriva_engine::Utils::logger::init_logger;
use deriva_engine::Utils::report::render;
use deriva_engine::error::EngineResult;
use deriva_engine::numerical::analysis::FunctionAnalyzer;
use std::env;
use std::process::ExitCode;

// deriva_engine [TASK_FILE]; the demo task runs when no file is given
fn run() -> EngineResult<()> {
    let task = match env::args().nth(1) {
        Some(path) => AnalysisTask::from_file(path)?,
        None => AnalysisTask::demo()?,
    };
    init_logger(task.log_level)?;
    let result = FunctionAnalyzer::new(task.config).analyze(&task.request)?;
    println!("{}", render(&result));
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
