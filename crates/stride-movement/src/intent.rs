//! Sprint / ADS intent and its compressed-flags encoding

use serde::{Deserialize, Serialize};

/// Locomotion intent read once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementIntent {
    pub sprint: bool,
    pub aim_down_sights: bool,
}

/// Bit-packed move flags sent with every client move
///
/// The low nibble belongs to the base movement framework; the custom bits
/// start at `0x10`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompressedFlags(pub u8);

impl CompressedFlags {
    pub const JUMP_PRESSED: u8 = 0x01;
    pub const WANTS_TO_CROUCH: u8 = 0x02;
    pub const RESERVED_1: u8 = 0x04;
    pub const RESERVED_2: u8 = 0x08;
    /// Custom bit 0: sprint intent
    pub const CUSTOM_0: u8 = 0x10;
    /// Custom bit 1: ADS intent
    pub const CUSTOM_1: u8 = 0x20;
    pub const CUSTOM_2: u8 = 0x40;
    pub const CUSTOM_3: u8 = 0x80;

    /// Raw byte as sent on the wire
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether every bit of `flag` is set
    pub fn contains(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Set or clear the bits of `flag`
    pub fn set(&mut self, flag: u8, enabled: bool) {
        if enabled {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    /// Add the intent bits to these flags
    pub fn with_intent(mut self, intent: MovementIntent) -> Self {
        self.set(Self::CUSTOM_0, intent.sprint);
        self.set(Self::CUSTOM_1, intent.aim_down_sights);
        self
    }

    /// Decode the intent bits
    pub fn intent(self) -> MovementIntent {
        MovementIntent {
            sprint: self.contains(Self::CUSTOM_0),
            aim_down_sights: self.contains(Self::CUSTOM_1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_round_trip() {
        for sprint in [false, true] {
            for aim_down_sights in [false, true] {
                let intent = MovementIntent {
                    sprint,
                    aim_down_sights,
                };
                let flags = CompressedFlags::default().with_intent(intent);
                assert_eq!(flags.intent(), intent);
            }
        }
    }

    #[test]
    fn test_intent_bits_leave_base_bits_alone() {
        let base = CompressedFlags(
            CompressedFlags::JUMP_PRESSED | CompressedFlags::WANTS_TO_CROUCH,
        );
        let flags = base.with_intent(MovementIntent {
            sprint: true,
            aim_down_sights: true,
        });
        assert_eq!(flags.bits(), 0x33);

        let cleared = flags.with_intent(MovementIntent::default());
        assert_eq!(cleared, base);
    }
}
