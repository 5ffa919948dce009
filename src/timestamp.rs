//! Capture-time extraction from camera filenames.
//!
//! Two naming conventions are recognized, tried in order:
//! - structured: `<prefix>_<YYYY-MM-DD>T<HH>[_;]<MM>[_;]<SS>...`, e.g.
//!   `Axis-BaldCA_2018-05-29T16_02_30_129496.jpg`
//! - raw epoch: a run of ten digits starting with `1`, e.g. `1499546263.jpg`
//!
//! A convention is used only when its pattern matches exactly once. Calendar
//! fields are interpreted in the local system time zone.

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone};
use regex::Regex;
use std::sync::OnceLock;

use crate::error::CurateError;

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const FS_SAFE_FORMAT: &str = "%Y-%m-%dT%H;%M;%S";
const RECORD_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn structured_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"([A-Za-z0-9-]+)_*([0-9]{4})-([0-9]{2})-([0-9]{2})T([0-9]{2})[_;]([0-9]{2})[_;]([0-9]{2})",
        )
        .expect("structured timestamp pattern")
    })
}

fn epoch_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"1[0-9]{9}").expect("epoch timestamp pattern"))
}

/// Resolved capture time of one image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureTime {
    /// Seconds since the Unix epoch; all comparisons use this.
    pub epoch: i64,
    /// Wall-clock time in the local zone; used for naming and display.
    pub local: NaiveDateTime,
}

impl CaptureTime {
    pub fn from_epoch(epoch: i64) -> Option<Self> {
        let local = Local.timestamp_opt(epoch, 0).earliest()?.naive_local();
        Some(Self { epoch, local })
    }

    /// `YYYY-MM-DDTHH:MM:SS`
    pub fn iso(&self) -> String {
        self.local.format(ISO_FORMAT).to_string()
    }

    /// ISO form with `;` in place of `:`, which some filesystems reject.
    pub fn filesystem_safe(&self) -> String {
        self.local.format(FS_SAFE_FORMAT).to_string()
    }

    /// `YYYY-MM-DD HH:MM:SS`, as written to the record logs.
    pub fn record_time(&self) -> String {
        self.local.format(RECORD_FORMAT).to_string()
    }
}

/// Parse the capture time out of `name`.
///
/// Fails with [`CurateError::UnrecognizedFilenameFormat`] when neither
/// convention matches exactly once or the structured fields are not a valid
/// calendar time.
pub fn extract_capture_time(name: &str) -> Result<CaptureTime> {
    let structured: Vec<_> = structured_re().captures_iter(name).collect();
    if let [caps] = structured.as_slice() {
        let field = |i: usize| caps[i].parse::<u32>().ok();
        let date = field(2)
            .zip(field(3))
            .zip(field(4))
            .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y as i32, m, d));
        let time = field(5)
            .zip(field(6))
            .zip(field(7))
            .and_then(|((h, m), s)| NaiveTime::from_hms_opt(h, m, s));
        let (Some(date), Some(time)) = (date, time) else {
            return Err(unrecognized(name));
        };
        let local = NaiveDateTime::new(date, time);
        let epoch = local_to_epoch(&local).ok_or_else(|| unrecognized(name))?;
        return Ok(CaptureTime { epoch, local });
    }

    let epochs: Vec<_> = epoch_re().find_iter(name).collect();
    if let [m] = epochs.as_slice() {
        let epoch: i64 = m.as_str().parse().map_err(|_| unrecognized(name))?;
        return CaptureTime::from_epoch(epoch).ok_or_else(|| unrecognized(name));
    }

    Err(unrecognized(name))
}

/// Epoch seconds of a local wall-clock time.
///
/// Repeated hours resolve to the earlier instant. Times inside a
/// spring-forward gap take the offset in force just before the transition,
/// so `02:30` in a skipped `02:00-03:00` hour lands at `03:30` after it.
pub fn local_to_epoch(local: &NaiveDateTime) -> Option<i64> {
    if let Some(resolved) = Local.from_local_datetime(local).earliest() {
        return Some(resolved.timestamp());
    }
    let before = (1..=24).find_map(|hours| {
        Local
            .from_local_datetime(&(*local - TimeDelta::hours(hours)))
            .latest()
    })?;
    let offset = i64::from(before.offset().fix().local_minus_utc());
    Some(local.and_utc().timestamp() - offset)
}

fn unrecognized(name: &str) -> anyhow::Error {
    CurateError::UnrecognizedFilenameFormat {
        name: name.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_epoch(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .earliest()
            .expect("local time")
            .timestamp()
    }

    #[test]
    fn parses_underscore_separated_structured_name() {
        let t = extract_capture_time("Axis-BaldCA_2018-05-29T16_02_30_129496.jpg").unwrap();
        assert_eq!(t.epoch, local_epoch(2018, 5, 29, 16, 2, 30));
        assert_eq!(t.iso(), "2018-05-29T16:02:30");
        assert_eq!(t.filesystem_safe(), "2018-05-29T16;02;30");
        assert_eq!(t.record_time(), "2018-05-29 16:02:30");
    }

    #[test]
    fn parses_semicolon_separated_structured_name() {
        let t = extract_capture_time("bm-n-mobo-c__2017-06-25T11;53;33.jpg").unwrap();
        assert_eq!(t.epoch, local_epoch(2017, 6, 25, 11, 53, 33));
        assert_eq!(t.iso(), "2017-06-25T11:53:33");
    }

    #[test]
    fn parses_raw_epoch_name() {
        let t = extract_capture_time("1499546263.jpg").unwrap();
        assert_eq!(t.epoch, 1_499_546_263);
        let expected = Local.timestamp_opt(1_499_546_263, 0).unwrap().naive_local();
        assert_eq!(t.local, expected);
    }

    #[test]
    fn raw_epoch_may_appear_anywhere() {
        let t = extract_capture_time("cam7-frame-1500000000-full.jpeg").unwrap();
        assert_eq!(t.epoch, 1_500_000_000);
    }

    #[test]
    fn structured_form_takes_priority() {
        let t = extract_capture_time("cam_2018-05-29T16_02_30_1499546263.jpg").unwrap();
        assert_eq!(t.epoch, local_epoch(2018, 5, 29, 16, 2, 30));
        // the epoch run doubles as the structured prefix
        let t = extract_capture_time("1499546263_2018-05-29T16_02_30.jpg").unwrap();
        assert_eq!(t.epoch, local_epoch(2018, 5, 29, 16, 2, 30));
    }

    #[test]
    fn repeated_structured_form_falls_back_to_epoch() {
        let t = extract_capture_time("a_2018-05-29T16_02_30_b_2018-05-29T16_02_31_1499546263.jpg")
            .unwrap();
        assert_eq!(t.epoch, 1_499_546_263);
    }

    #[test]
    fn extraction_is_deterministic() {
        let name = "Axis-BaldCA_2018-05-29T16_10_00_000001.jpg";
        assert_eq!(
            extract_capture_time(name).unwrap(),
            extract_capture_time(name).unwrap()
        );
    }

    #[test]
    fn rejects_unrecognized_names() {
        for name in [
            "IMG_0001.jpg",
            "0499546263.jpg",
            "1499546263_1499546264.jpg",
            "a_2018-05-29T16_02_30_b_2018-05-29T16_02_31.jpg",
            "bm-n-mobo-c__2017-06-25z11;53;33.jpg",
        ] {
            let err = extract_capture_time(name).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<CurateError>(),
                    Some(CurateError::UnrecognizedFilenameFormat { .. })
                ),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn rejects_impossible_calendar_fields() {
        let err = extract_capture_time("cam_2018-13-29T16_02_30.jpg").unwrap_err();
        assert!(err.downcast_ref::<CurateError>().is_some());
        let err = extract_capture_time("cam_2018-05-29T25_02_30.jpg").unwrap_err();
        assert!(err.downcast_ref::<CurateError>().is_some());
    }
}
