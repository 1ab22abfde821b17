//! Small UI helpers: rate and age formatting.

/// Render a rate in Mb/s with a unit that keeps the number readable.
pub fn fmt_rate(mbps: f64) -> String {
    if mbps < 0.005 {
        return "0".into();
    }
    if mbps < 1.0 {
        return format!("{:.0} Kb/s", mbps * 1000.0);
    }
    if mbps < 1000.0 {
        return format!("{mbps:.1} Mb/s");
    }
    format!("{:.2} Gb/s", mbps / 1000.0)
}

pub fn fmt_age(secs: i64) -> String {
    if secs < 0 {
        return "0s".into();
    }
    if secs < 60 {
        return format!("{secs}s");
    }
    let m = secs / 60;
    let s = secs % 60;
    if m < 60 {
        return format!("{m}m {s:02}s");
    }
    format!("{}h {:02}m", m / 60, m % 60)
}

/// Collector polling duration, seconds with centisecond precision.
pub fn fmt_poll_secs(secs: f64) -> String {
    format!("{secs:.2}s")
}
