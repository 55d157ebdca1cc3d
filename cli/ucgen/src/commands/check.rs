//! `ucgen check`: manifest validation without generating anything.

use anyhow::Result;
use ucgen_targets::{check_manifest, ProjectManifest, TargetError, ValidationIssue};

/// Validate the manifest and print every issue. Fails when any issue is an error.
pub fn run(manifest: &ProjectManifest) -> Result<()> {
    let warnings = validated(manifest)?;
    if warnings == 0 {
        println!("{}: ok", manifest.project.name);
    } else {
        println!("{}: ok with {warnings} warning(s)", manifest.project.name);
    }
    Ok(())
}

/// Print the manifest's issues and return how many warnings there were.
pub(crate) fn validated(manifest: &ProjectManifest) -> Result<usize> {
    match check_manifest(manifest) {
        Ok(warnings) => {
            print_issues(&warnings);
            Ok(warnings.len())
        }
        Err(err) => {
            if let TargetError::Invalid { issues, .. } = &err {
                print_issues(issues);
            }
            Err(err.into())
        }
    }
}

fn print_issues(issues: &[ValidationIssue]) {
    for issue in issues {
        eprintln!("{}: {issue}", issue.severity);
    }
}
