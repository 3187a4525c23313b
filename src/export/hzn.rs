use super::HorizonProfile;
use crate::math::{floor_at_horizon, round_to_tenth};

pub const HZN_HEADER: &str = "# Azimuth Altitude";

/// Plain horizon file: a header and one `"<azimuth> <altitude>"` line for
/// every integer degree 0-359.
pub fn write_profile(profile: &HorizonProfile) -> String {
    let mut lines = Vec::with_capacity(361);
    lines.push(HZN_HEADER.to_string());
    lines.extend((0..360).map(|azimuth| {
        let altitude = floor_at_horizon(round_to_tenth(profile.altitude_at(azimuth)));
        format!("{} {}", azimuth, altitude)
    }));

    let mut content = lines.join("\n");
    content.push('\n');
    content
}
