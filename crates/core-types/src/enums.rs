use serde::{Deserialize, Serialize};

/// The direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

/// The discrete position intent emitted for a single bar.
///
/// On the wire this is the integer convention `+1 / -1 / 0`:
/// `Long` enters or holds a long, `Short` exits a long (or enters a short when
/// shorting is allowed), and `Flat` means no action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Signal {
    Long,
    Short,
    #[default]
    Flat,
}

impl Signal {
    /// The integer form of the signal: `+1`, `-1` or `0`.
    pub fn value(self) -> i8 {
        match self {
            Signal::Long => 1,
            Signal::Short => -1,
            Signal::Flat => 0,
        }
    }

    pub fn is_flat(self) -> bool {
        self == Signal::Flat
    }

    /// The side a position would take if this signal opened it.
    pub fn entry_side(self) -> Option<Side> {
        match self {
            Signal::Long => Some(Side::Long),
            Signal::Short => Some(Side::Short),
            Signal::Flat => None,
        }
    }

    /// Whether this signal closes a position held on `side`.
    pub fn exits(self, side: Side) -> bool {
        matches!(
            (self, side),
            (Signal::Short, Side::Long) | (Signal::Long, Side::Short)
        )
    }
}

impl TryFrom<i8> for Signal {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Signal::Long),
            -1 => Ok(Signal::Short),
            0 => Ok(Signal::Flat),
            other => Err(format!("signal must be one of -1, 0, 1 (got {other})")),
        }
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.value()
    }
}

/// Why a trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// An opposing signal closed the position.
    Signal,
    /// The caller asked for open positions to be marked to market at the last bar.
    EndOfData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_integer_convention() {
        assert_eq!(Signal::Long.value(), 1);
        assert_eq!(Signal::Short.value(), -1);
        assert_eq!(Signal::Flat.value(), 0);
        assert_eq!(Signal::try_from(-1), Ok(Signal::Short));
        assert!(Signal::try_from(2).is_err());
    }

    #[test]
    fn exits_only_the_opposing_side() {
        assert!(Signal::Short.exits(Side::Long));
        assert!(Signal::Long.exits(Side::Short));
        assert!(!Signal::Long.exits(Side::Long));
        assert!(!Signal::Flat.exits(Side::Long));
    }

    #[test]
    fn signal_serializes_as_integer() {
        let json = serde_json::to_string(&vec![Signal::Long, Signal::Flat, Signal::Short]).unwrap();
        assert_eq!(json, "[1,0,-1]");
        let back: Vec<Signal> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Signal::Long, Signal::Flat, Signal::Short]);
    }
}
