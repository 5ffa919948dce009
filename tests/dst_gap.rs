//! Wall-clock times skipped by a spring-forward transition, with the local
//! zone pinned to US Pacific for this test process.

use anyhow::Result;
use chrono::{Local, Offset, TimeZone};

use smoke_curator::{extract_capture_time, sequence, FilenamePolicy};

/// Pins `TZ` and reports whether the host has zone data for it.
fn pin_pacific() -> bool {
    std::env::set_var("TZ", "America/Los_Angeles");
    Local
        .with_ymd_and_hms(2018, 1, 15, 12, 0, 0)
        .single()
        .map(|t| t.offset().fix().local_minus_utc())
        == Some(-8 * 3600)
}

#[test]
fn skipped_hour_uses_the_offset_before_the_transition() -> Result<()> {
    if !pin_pacific() {
        eprintln!("skipping: no zone data for America/Los_Angeles");
        return Ok(());
    }

    // 2018-03-11 02:00 PST jumped to 03:00 PDT.
    let gap = extract_capture_time("Axis-BaldCA_2018-03-11T02_30_00_000001.jpg")?;
    assert_eq!(gap.epoch, 1_520_764_200);
    assert_eq!(gap.iso(), "2018-03-11T02:30:00");

    let batch = sequence(
        [
            "Axis-BaldCA_2018-03-11T02_30_00_000001.jpg",
            "Axis-BaldCA_2018-03-11T01_59_00_000001.jpg",
        ],
        FilenamePolicy::Abort,
    )?;
    let epochs: Vec<i64> = batch.iter().map(|f| f.time.epoch).collect();
    assert_eq!(epochs, vec![1_520_762_340, 1_520_764_200]);
    assert!(batch.skipped().is_empty());
    Ok(())
}
