// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Number formatting shared by the outline and the charts.

/// `0.4212` -> `"42.12%"`.
pub fn format_percentage(ratio: f64) -> String {
    format!("{}%", format_ratio(ratio))
}

/// `0.4212` -> `"42.12"`. Chart values carry no percent sign.
pub fn format_ratio(ratio: f64) -> String {
    format!("{:.2}", ratio * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.4212), "42.12%");
        assert_eq!(format_percentage(1.0), "100.00%");
        assert_eq!(format_percentage(0.0), "0.00%");
        assert_eq!(format_percentage(0.42), "42.00%");
    }

    #[test]
    fn test_format_ratio_rounds_to_two_places() {
        assert_eq!(format_ratio(0.123456), "12.35");
        assert_eq!(format_ratio(0.9999999), "100.00");
    }
}
