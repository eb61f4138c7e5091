//! Mapping recorded input bits onto driver controls
//!
//! Drivers describe their controls with free-form labels such as
//! `"p1 up"` or `"p2 fire 3"`. A recorded mask bit is bound to every switch
//! control whose label names a known player and action. The label rules are
//! fixed for compatibility with existing recordings:
//!
//! | label contains | bit |
//! |----------------|-----|
//! | ` start`       | 1   |
//! | ` up`          | 2   |
//! | ` down`        | 3   |
//! | ` left`        | 4   |
//! | ` right`       | 5   |
//! | ` fire 1`..`6` | 6..11 |

use smallvec::SmallVec;

use crate::machine::{ControlInfo, ControlKind, ControlSlot, Machine};

/// Highest fire button number carried by a recording
pub const MAX_FIRE_BUTTON: u8 = 6;

/// Bit of `fire 1`; later fire buttons follow contiguously
pub const FIRE_BASE_BIT: u8 = 6;

const PLAYER_PREFIXES: [(&str, u8); 2] = [("p1 ", 0), ("p2 ", 1)];

const DIRECTION_BITS: [(&str, u8); 5] = [
    (" start", 1),
    (" up", 2),
    (" down", 3),
    (" left", 4),
    (" right", 5),
];

/// One recorded bit bound to a machine control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBinding {
    pub player: u8,
    pub bit: u8,
    pub slot: ControlSlot,
}

/// Bindings in metadata scan order; duplicates are kept
pub type BindingSet = SmallVec<[ControlBinding; 32]>;

/// Player index named by a label prefix, if any
pub fn player_from_label(label: &str) -> Option<u8> {
    PLAYER_PREFIXES
        .iter()
        .find(|(prefix, _)| label.starts_with(prefix))
        .map(|&(_, player)| player)
}

/// Logical bit named by a label, if any
pub fn bit_from_label(label: &str) -> Option<u8> {
    if let Some(&(_, bit)) = DIRECTION_BITS.iter().find(|(name, _)| label.contains(name)) {
        return Some(bit);
    }

    let (_, rest) = label.split_once(" fire ")?;
    let n = leading_integer(rest)?;
    (1..=i64::from(MAX_FIRE_BUTTON))
        .contains(&n)
        .then(|| FIRE_BASE_BIT + (n as u8 - 1))
}

/// Parse a leading base-10 integer the way C `strtol` does: optional
/// whitespace, optional sign, then digits up to the first non-digit.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long digit runs; anything that large is out of range anyway
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Resolve one control descriptor into a binding
pub fn resolve(info: &ControlInfo, slot: ControlSlot) -> Option<ControlBinding> {
    let player = player_from_label(&info.label)?;
    let bit = bit_from_label(&info.label)?;
    if info.kind != ControlKind::Switch {
        return None;
    }
    Some(ControlBinding { player, bit, slot })
}

/// Scan every control the machine describes and bind the recognised ones
pub fn build<M: Machine + ?Sized>(machine: &M) -> BindingSet {
    let bindings: BindingSet = (0..machine.control_count())
        .filter_map(|index| {
            let info = machine.control_info(index)?;
            resolve(&info, ControlSlot(index))
        })
        .collect();

    tracing::debug!(
        controls = machine.control_count(),
        bound = bindings.len(),
        "built replay input bindings"
    );
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessMachine;
    use crate::machine::ControlInfo;

    #[test]
    fn test_player_prefix() {
        assert_eq!(player_from_label("p1 up"), Some(0));
        assert_eq!(player_from_label("p2 fire 1"), Some(1));
        assert_eq!(player_from_label("p3 up"), None);
        assert_eq!(player_from_label("P1 up"), None);
        assert_eq!(player_from_label("p1up"), None);
        assert_eq!(player_from_label("service"), None);
    }

    #[test]
    fn test_bit_table() {
        let table = [
            ("p1 start", Some(1)),
            ("p1 up", Some(2)),
            ("p1 down", Some(3)),
            ("p1 left", Some(4)),
            ("p1 right", Some(5)),
            ("p1 fire 1", Some(6)),
            ("p1 fire 2", Some(7)),
            ("p1 fire 3", Some(8)),
            ("p1 fire 4", Some(9)),
            ("p1 fire 5", Some(10)),
            ("p1 fire 6", Some(11)),
            ("p1 fire 7", None),
            ("p1 fire 0", None),
            ("p1 fire 10", None),
            ("p1 fire", None),
            ("p1 fire x", None),
            ("p1 coin", None),
            ("reset", None),
        ];
        for (label, expected) in table {
            assert_eq!(bit_from_label(label), expected, "label {label:?}");
        }
    }

    #[test]
    fn test_fire_number_parsing() {
        assert_eq!(bit_from_label("p1 fire  2"), Some(7));
        assert_eq!(bit_from_label("p1 fire +3"), Some(8));
        assert_eq!(bit_from_label("p1 fire 4 (kick)"), Some(9));
        assert_eq!(bit_from_label("p1 fire -1"), None);
        assert_eq!(bit_from_label("p1 fire 99999999999999999999999"), None);
    }

    #[test]
    fn test_direction_wins_over_fire() {
        // Directions are checked first, as recordings expect
        assert_eq!(bit_from_label("p1 fire 1 up"), Some(2));
    }

    #[test]
    fn test_player_two_fire_three() {
        let binding = resolve(&ControlInfo::switch("p2 fire 3"), ControlSlot(4)).unwrap();
        assert_eq!(binding.player, 1);
        assert_eq!(binding.bit, 8);
        assert_eq!(binding.slot, ControlSlot(4));
    }

    #[test]
    fn test_non_switch_ignored() {
        let info = ControlInfo {
            label: "p1 up".into(),
            kind: ControlKind::Analog,
        };
        assert_eq!(resolve(&info, ControlSlot(0)), None);
    }

    #[test]
    fn test_build_keeps_order_and_duplicates() {
        let machine = HeadlessMachine::new(&[])
            .with_control(ControlInfo::switch("p1 coin"))
            .with_control(ControlInfo::switch("p1 up"))
            .with_control(ControlInfo {
                label: "p1 dial".into(),
                kind: ControlKind::Analog,
            })
            .with_control(ControlInfo::switch("p2 fire 1"))
            .with_control(ControlInfo::switch("p1 up (alt)"))
            .with_control(ControlInfo::switch("dip switch 1"));

        let bindings = build(&machine);

        assert_eq!(
            bindings.as_slice(),
            &[
                ControlBinding {
                    player: 0,
                    bit: 2,
                    slot: ControlSlot(1)
                },
                ControlBinding {
                    player: 1,
                    bit: 6,
                    slot: ControlSlot(3)
                },
                ControlBinding {
                    player: 0,
                    bit: 2,
                    slot: ControlSlot(4)
                },
            ]
        );
    }

    #[test]
    fn test_build_skips_undescribed_controls() {
        let machine = HeadlessMachine::new(&[])
            .with_control(ControlInfo::switch("p1 up"))
            .with_undescribed_control()
            .with_control(ControlInfo::switch("p1 down"));

        let bindings = build(&machine);
        let slots: Vec<_> = bindings.iter().map(|b| b.slot).collect();
        assert_eq!(slots, vec![ControlSlot(0), ControlSlot(2)]);
    }
}
