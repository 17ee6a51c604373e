//! Screen layout for the dice roll animation.
//!
//! A roll paints six dice in two rows of three on a 320x240 panel. The core
//! only decides which face lands in which slot; drawing is left to the
//! [`Renderer`](crate::hal::Renderer). The pip layout is exposed so renderers
//! draw faces consistently.

use core::fmt;

/// Number of dice drawn per roll.
pub const ANIMATION_DRAWS: usize = 6;

/// Edge length of a die, in pixels.
pub const DIE_SIZE: u16 = 84;

/// Pip centre offsets from a die's top-left corner, per axis.
pub const PIP_NEAR: u16 = 13;
pub const PIP_MID: u16 = 41;
pub const PIP_FAR: u16 = 69;

/// Pip radius, in pixels.
pub const PIP_RADIUS: u16 = 10;

/// Pixel coordinate on the display.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ScreenPoint {
    pub x: u16,
    pub y: u16,
}

impl ScreenPoint {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Top-left corner of each die slot, row-major.
pub const DIE_POSITIONS: [ScreenPoint; ANIMATION_DRAWS] = [
    ScreenPoint::new(17, 24),
    ScreenPoint::new(118, 24),
    ScreenPoint::new(219, 24),
    ScreenPoint::new(17, 132),
    ScreenPoint::new(118, 132),
    ScreenPoint::new(219, 132),
];

/// Value shown on a six-sided die.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct DieFace(u8);

impl DieFace {
    pub const fn new(value: u8) -> Option<Self> {
        if value >= 1 && value <= 6 {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Pip centres relative to the die's top-left corner.
    pub const fn pips(self) -> &'static [(u16, u16)] {
        match self.0 {
            1 => &[(PIP_MID, PIP_MID)],
            2 => &[(PIP_NEAR, PIP_NEAR), (PIP_FAR, PIP_FAR)],
            3 => &[(PIP_NEAR, PIP_NEAR), (PIP_MID, PIP_MID), (PIP_FAR, PIP_FAR)],
            4 => &[
                (PIP_NEAR, PIP_NEAR),
                (PIP_FAR, PIP_NEAR),
                (PIP_NEAR, PIP_FAR),
                (PIP_FAR, PIP_FAR),
            ],
            5 => &[
                (PIP_NEAR, PIP_NEAR),
                (PIP_FAR, PIP_NEAR),
                (PIP_MID, PIP_MID),
                (PIP_NEAR, PIP_FAR),
                (PIP_FAR, PIP_FAR),
            ],
            _ => &[
                (PIP_NEAR, PIP_NEAR),
                (PIP_FAR, PIP_NEAR),
                (PIP_NEAR, PIP_MID),
                (PIP_FAR, PIP_MID),
                (PIP_NEAR, PIP_FAR),
                (PIP_FAR, PIP_FAR),
            ],
        }
    }
}

impl fmt::Display for DieFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_outside_one_to_six_are_rejected() {
        assert!(DieFace::new(0).is_none());
        assert!(DieFace::new(7).is_none());
        assert_eq!(DieFace::new(4).map(DieFace::value), Some(4));
    }

    #[test]
    fn pip_count_matches_face_value() {
        for value in 1..=6 {
            let face = DieFace::new(value).expect("valid face");
            assert_eq!(face.pips().len(), usize::from(value));
        }
    }

    #[test]
    fn pips_stay_inside_the_die() {
        for value in 1..=6 {
            let face = DieFace::new(value).expect("valid face");
            for &(x, y) in face.pips() {
                assert!(x >= PIP_RADIUS && x + PIP_RADIUS <= DIE_SIZE);
                assert!(y >= PIP_RADIUS && y + PIP_RADIUS <= DIE_SIZE);
            }
        }
    }

    #[test]
    fn slots_do_not_overlap_and_fit_the_panel() {
        for (index, origin) in DIE_POSITIONS.iter().enumerate() {
            assert!(origin.x + DIE_SIZE <= 320);
            assert!(origin.y + DIE_SIZE <= 240);
            for other in &DIE_POSITIONS[index + 1..] {
                let apart_x = origin.x.abs_diff(other.x) >= DIE_SIZE;
                let apart_y = origin.y.abs_diff(other.y) >= DIE_SIZE;
                assert!(apart_x || apart_y);
            }
        }
        assert_eq!(DIE_POSITIONS[3], ScreenPoint::new(17, 132));
    }
}
