use std::path::Path;
use std::time::Duration;

use pixmerge::{GroupSet, Location, StepReport};

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

fn percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// One merge step: changed and same pixel counts with their share of the frame.
pub fn format_step(report: &StepReport) -> String {
    let same = report.total - report.changed;
    format!(
        "{}  changed {} ({})  same {} ({})",
        report.file.display(),
        report.changed,
        percent(report.changed_ratio()),
        same,
        percent(report.same_ratio()),
    )
}

pub fn print_step(report: &StepReport) {
    let label = if report.changed > 0 {
        "\x1b[33mDIFF\x1b[0m"
    } else {
        "\x1b[32mSAME\x1b[0m"
    };
    println!("  {label}  {}", format_step(report));
}

pub fn print_seeded(seed: &Path, width: u32, height: u32) {
    println!("  \x1b[2mSEED\x1b[0m  {}  ({width}x{height})", seed.display());
}

/// Final line after a merge run.
pub fn print_summary(reports: &[StepReport], elapsed: Duration, saved: Option<&Path>) {
    let changed: u64 = reports.iter().map(|r| r.changed).sum();
    println!();
    match saved {
        Some(path) => println!(
            "{} image(s) merged, {changed} pixel change(s), saved to {} in {}",
            reports.len(),
            path.display(),
            format_duration(elapsed)
        ),
        None => println!(
            "{} image(s) merged, {changed} pixel change(s) in {}",
            reports.len(),
            format_duration(elapsed)
        ),
    }
}

pub fn format_location(location: Option<&Location>) -> String {
    match location {
        Some(l) => format!(
            "found at ({}, {}) rotated {}°",
            l.x,
            l.y,
            l.orientation.degrees()
        ),
        None => "not found".to_string(),
    }
}

pub fn print_location(sub: &Path, location: Option<&Location>) {
    let label = if location.is_some() {
        "\x1b[32mFOUND\x1b[0m"
    } else {
        "\x1b[31m MISS\x1b[0m"
    };
    println!("  {label}  {}  {}", sub.display(), format_location(location));
}

pub fn print_hint(hint: &str) {
    eprintln!("  \x1b[2mhint:\x1b[0m {hint}");
}

/// List groups in their current order, at most `limit` of them.
pub fn print_groups(groups: &GroupSet, limit: usize) {
    if groups.is_empty() {
        println!("No difference groups.");
        return;
    }
    println!(
        "{} group(s), {} pixel(s):",
        groups.len(),
        groups.pixel_count()
    );
    for (i, group) in groups.iter().take(limit).enumerate() {
        println!("  {:>3}. {group}", i + 1);
    }
    if groups.len() > limit {
        println!("  \x1b[2m... and {} more\x1b[0m", groups.len() - limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use pixmerge::Orientation;

    #[test]
    fn step_line_shows_counts_and_percentages() {
        let r = StepReport {
            file: PathBuf::from("b.png"),
            changed: 100,
            total: 10_000,
        };
        assert_eq!(
            format_step(&r),
            "b.png  changed 100 (1.00%)  same 9900 (99.00%)"
        );
    }

    #[test]
    fn location_text() {
        let l = Location {
            x: 3,
            y: 4,
            orientation: Orientation::Rotated270,
        };
        assert_eq!(format_location(Some(&l)), "found at (3, 4) rotated 270°");
        assert_eq!(format_location(None), "not found");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
    }
}
