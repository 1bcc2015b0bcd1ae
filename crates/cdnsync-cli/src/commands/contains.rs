//! Contains command implementation

use crate::cli::ContainsArgs;
use crate::error::convert_update_error;
use crate::output::CandidateVerdict;
use crate::output::ContainmentCheck;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use cdnsync_core::is_contained;
use cdnsync_core::types::AllowedRoot;

pub fn execute(args: &ContainsArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let root = AllowedRoot::new(&args.root).map_err(|e| convert_update_error(e, "contains"))?;

    let candidates: Vec<CandidateVerdict> = args
        .candidates
        .iter()
        .map(|candidate| CandidateVerdict {
            path: candidate.clone(),
            contained: is_contained(&root, [candidate]),
        })
        .collect();

    let result = ContainmentCheck {
        root: root.to_string(),
        contained: candidates.iter().all(|c| c.contained),
        candidates,
    };

    formatter.format_containment(&result)?;

    if !result.contained {
        bail!("path escapes {root}");
    }
    Ok(())
}
