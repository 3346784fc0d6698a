//! RGB colour values and the boundary normalization of LED colour input.
//!
//! The frontend is allowed to spell an LED colour four ways: a palette name
//! (`"red"`), a channel triple (`[255, 0, 0]`), a channel object
//! (`{"red": 255, "green": 0, "blue": 0}`), or a per-LED list of any of
//! those.  [`RgbInput`] accepts every spelling during deserialization and
//! [`RgbInput::normalize`] flattens the result into exactly one structured
//! form, a fixed `[Rgb; LED_COUNT]` array, so nothing past the wire boundary
//! ever inspects the original shape.

use serde::{Deserialize, Serialize};

/// Number of addressable LEDs on the chassis.
pub const LED_COUNT: usize = 4;

/// One RGB triple, each channel in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// All channels off.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
}

/// The eight-colour palette accepted as a string colour name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    None,
    White,
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
}

impl NamedColor {
    /// The channel values of this palette entry.
    pub const fn rgb(self) -> Rgb {
        match self {
            NamedColor::None => Rgb::new(0, 0, 0),
            NamedColor::White => Rgb::new(255, 255, 255),
            NamedColor::Red => Rgb::new(255, 0, 0),
            NamedColor::Green => Rgb::new(0, 255, 0),
            NamedColor::Blue => Rgb::new(0, 0, 255),
            NamedColor::Yellow => Rgb::new(255, 255, 0),
            NamedColor::Magenta => Rgb::new(255, 0, 255),
            NamedColor::Cyan => Rgb::new(0, 255, 255),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire-side colour input
// ---------------------------------------------------------------------------

/// One LED colour as the frontend may spell it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RgbScalar {
    /// A palette name, e.g. `"magenta"`.
    Named(NamedColor),
    /// A `[r, g, b]` channel triple.
    Triple([u8; 3]),
    /// A `{"red": .., "green": .., "blue": ..}` channel object.
    Channels { red: u8, green: u8, blue: u8 },
}

impl From<RgbScalar> for Rgb {
    fn from(scalar: RgbScalar) -> Rgb {
        match scalar {
            RgbScalar::Named(name) => name.rgb(),
            RgbScalar::Triple([red, green, blue]) => Rgb::new(red, green, blue),
            RgbScalar::Channels { red, green, blue } => Rgb::new(red, green, blue),
        }
    }
}

/// The full `led_rgb` parameter shape: one colour broadcast to every LED, or
/// a list assigning each LED its own colour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RgbInput {
    Single(RgbScalar),
    PerLed(Vec<RgbScalar>),
}

impl RgbInput {
    /// Flatten into one colour per LED.
    ///
    /// A single value is broadcast to all [`LED_COUNT`] LEDs; a list must
    /// carry exactly one entry per LED.
    pub fn normalize(self) -> Result<[Rgb; LED_COUNT], String> {
        match self {
            RgbInput::Single(scalar) => Ok([Rgb::from(scalar); LED_COUNT]),
            RgbInput::PerLed(scalars) => {
                if scalars.len() != LED_COUNT {
                    return Err(format!(
                        "expected {LED_COUNT} per-LED values, got {}",
                        scalars.len()
                    ));
                }
                let mut leds = [Rgb::BLACK; LED_COUNT];
                for (led, scalar) in leds.iter_mut().zip(scalars) {
                    *led = Rgb::from(scalar);
                }
                Ok(leds)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: serde_json::Value) -> Result<[Rgb; LED_COUNT], String> {
        let input: RgbInput =
            serde_json::from_value(value).map_err(|e| e.to_string())?;
        input.normalize()
    }

    #[test]
    fn named_color_broadcasts_to_all_leds() {
        let leds = normalize(json!("red")).unwrap();
        assert_eq!(leds, [Rgb::new(255, 0, 0); LED_COUNT]);
    }

    #[test]
    fn triple_broadcasts_to_all_leds() {
        let leds = normalize(json!([10, 20, 30])).unwrap();
        assert_eq!(leds, [Rgb::new(10, 20, 30); LED_COUNT]);
    }

    #[test]
    fn channel_object_broadcasts_to_all_leds() {
        let leds = normalize(json!({"red": 255, "green": 0, "blue": 128})).unwrap();
        assert_eq!(leds, [Rgb::new(255, 0, 128); LED_COUNT]);
    }

    #[test]
    fn per_led_list_mixes_spellings() {
        let leds = normalize(json!(["none", [1, 2, 3], "cyan", {"red": 9, "green": 8, "blue": 7}]))
            .unwrap();
        assert_eq!(leds[0], Rgb::BLACK);
        assert_eq!(leds[1], Rgb::new(1, 2, 3));
        assert_eq!(leds[2], Rgb::new(0, 255, 255));
        assert_eq!(leds[3], Rgb::new(9, 8, 7));
    }

    #[test]
    fn per_led_list_of_wrong_length_is_rejected() {
        let err = normalize(json!(["red", "green"])).unwrap_err();
        assert!(err.contains("expected 4"));
    }

    #[test]
    fn unknown_color_name_is_rejected() {
        assert!(normalize(json!("ultraviolet")).is_err());
    }

    #[test]
    fn out_of_range_channel_is_rejected() {
        assert!(normalize(json!([0, 0, 300])).is_err());
    }

    #[test]
    fn palette_covers_all_eight_entries() {
        assert_eq!(NamedColor::White.rgb(), Rgb::new(255, 255, 255));
        assert_eq!(NamedColor::Yellow.rgb(), Rgb::new(255, 255, 0));
        assert_eq!(NamedColor::Magenta.rgb(), Rgb::new(255, 0, 255));
        assert_eq!(NamedColor::None.rgb(), Rgb::BLACK);
    }
}
