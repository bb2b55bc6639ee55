/// Minutes between two adjacent selectable times
pub const SLOT_MINUTES: u32 = 30;

/// Parse time string in HH:MM format
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Minutes since midnight for an HH:MM string
pub fn time_to_minutes(time_str: &str) -> Option<u32> {
    let (hour, minute) = parse_time(time_str)?;
    Some(hour * 60 + minute)
}

/// Format minutes since midnight back to HH:MM
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Duration in decimal hours between two HH:MM strings.
///
/// Shifts never wrap past midnight: an end before the start yields zero, as
/// does an empty or unparsable time on either side.
pub fn compute_hours(start: &str, end: &str) -> f64 {
    match (time_to_minutes(start), time_to_minutes(end)) {
        (Some(start), Some(end)) if end > start => f64::from(end - start) / 60.0,
        _ => 0.0,
    }
}

/// Half-hour steps from `start` up to and including `end`
pub fn generate_time_slots(start: &str, end: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (time_to_minutes(start), time_to_minutes(end)) else {
        return Vec::new();
    };

    (start..=end)
        .step_by(SLOT_MINUTES as usize)
        .map(minutes_to_time)
        .collect()
}
