//! `qa` command: aggregate metrics over a resolved output table.

use anyhow::Result;

use crate::cli::QaArgs;
use crate::io::read_resolved;
use crate::report::QaReport;

pub fn run(args: &QaArgs) -> Result<()> {
    let rows = read_resolved(&args.input)?;
    let report =
        QaReport::from_rows(rows.iter().map(|(r, s, c)| (r.as_str(), s.as_str(), *c)));
    println!("{report}");
    Ok(())
}
