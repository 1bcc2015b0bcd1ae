//! Update command implementation

use crate::cli::UpdateArgs;
use crate::error::convert_update_error;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use anyhow::bail;
use cdnsync_core::UpdateConfig;
use cdnsync_core::report::NoopProgress;
use cdnsync_core::update::MirrorSource;
use cdnsync_core::update::discover_libraries;
use cdnsync_core::update::run_batch;

pub fn execute(
    args: &UpdateArgs,
    formatter: &dyn OutputFormatter,
    no_progress: bool,
) -> Result<()> {
    if !args.mirror.is_dir() {
        bail!(
            "Mirror directory not found: {}\n\
             HINT: The mirror must be laid out as <npmName>/<version>.tgz.",
            args.mirror.display()
        );
    }

    let mut config = UpdateConfig {
        libs_dir: args.libs_dir.clone(),
        max_parallel_libraries: args.jobs,
        ..Default::default()
    };
    args.options.apply(&mut config);

    let libraries = discover_libraries(&config.libs_dir, &args.pattern)
        .map_err(|e| convert_update_error(e, &args.pattern))?;
    if libraries.is_empty() {
        formatter.format_warning(&format!(
            "No npm-enabled libraries match '{}' in {}",
            args.pattern,
            config.libs_dir.display()
        ));
    }

    let source = MirrorSource::new(&args.mirror);
    let result = if !no_progress && CliProgress::should_show() {
        let progress = CliProgress::new(libraries.len());
        run_batch(libraries, &source, &config, &progress)
    } else {
        run_batch(libraries, &source, &config, &NoopProgress)
    };
    let report = result.map_err(|e| convert_update_error(e, &args.pattern))?;

    formatter.format_update_result(&report)?;
    Ok(())
}
