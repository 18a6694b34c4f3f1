use std::path::Path;
use std::process::ExitCode;

use searchable_pdf::config::job::JobFile;
use searchable_pdf::config::merged::MergedConfig;
use searchable_pdf::config;
use searchable_pdf::pipeline::Pipeline;
use searchable_pdf::pipeline::job_runner::JobConfig;
use searchable_pdf::pipeline::orchestrator::run_all_jobs;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: searchable_pdf <jobs.yaml>...");
        eprintln!("  Add a searchable text layer to scanned PDFs and images.");
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("searchable_pdf {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_tracing();

    // One pipeline per job file, since each job file may carry its own settings.yaml.
    let mut batches: Vec<(Pipeline, Vec<JobConfig>)> = Vec::new();

    for job_file_arg in &args {
        let job_file_path = Path::new(job_file_arg);

        let settings = match config::load_settings_for_job(job_file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to load settings for {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let yaml_content = match std::fs::read_to_string(job_file_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ERROR: Failed to read job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let job_file = match JobFile::from_yaml(&yaml_content) {
            Ok(jf) => jf,
            Err(e) => {
                eprintln!("ERROR: Failed to parse job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let job_dir = match config::job_dir(job_file_path) {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("ERROR: {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let mut job_configs = Vec::with_capacity(job_file.jobs.len());
        for job in &job_file.jobs {
            let mut merged = MergedConfig::new(&settings, job);
            merged.debug_dir = merged
                .debug_dir
                .map(|dir| config::resolve_job_path(&job_dir, &dir));
            if let Err(e) = merged.validate() {
                eprintln!("ERROR: Invalid job for {}: {e}", job.input);
                return ExitCode::FAILURE;
            }

            let input_path = config::resolve_job_path(&job_dir, Path::new(&job.input));
            let output_path = config::resolve_job_path(&job_dir, &job.output_path());
            job_configs.push(JobConfig::from_merged(input_path, output_path, &merged));
        }

        let pipeline = match Pipeline::from_settings(&settings) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("ERROR: Failed to set up OCR pipeline for {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        batches.push((pipeline, job_configs));
    }

    let mut has_error = false;
    for (pipeline, job_configs) in &batches {
        let results = run_all_jobs(pipeline, job_configs);

        for (i, result) in results.iter().enumerate() {
            match result {
                Ok(job_result) => {
                    eprintln!(
                        "OK: {} -> {} ({} pages)",
                        job_result.input_path.display(),
                        job_result.output_path.display(),
                        job_result.pages_processed
                    );
                }
                Err(e) => {
                    eprintln!(
                        "ERROR: {} -> {}: {e}",
                        job_configs[i].input_path.display(),
                        job_configs[i].output_path.display()
                    );
                    has_error = true;
                }
            }
        }
    }

    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
