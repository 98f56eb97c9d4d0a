use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Pinky,
    Ring,
    Middle,
    Index,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FingerAssignment {
    pub hand: Hand,
    pub finger: Finger,
}

impl FingerAssignment {
    pub fn new(hand: Hand, finger: Finger) -> Self {
        Self { hand, finger }
    }

    /// The home-row key this finger rests on.
    pub fn home_key(self) -> char {
        use Finger::*;
        use Hand::*;

        match (self.hand, self.finger) {
            (Left, Pinky) => 'a',
            (Left, Ring) => 's',
            (Left, Middle) => 'd',
            (Left, Index) => 'f',
            (Right, Index) => 'j',
            (Right, Middle) => 'k',
            (Right, Ring) => 'l',
            (Right, Pinky) => ';',
        }
    }
}

impl fmt::Display for FingerAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hand = match self.hand {
            Hand::Left => "left",
            Hand::Right => "right",
        };
        let finger = match self.finger {
            Finger::Pinky => "pinky",
            Finger::Ring => "ring",
            Finger::Middle => "middle",
            Finger::Index => "index",
        };
        write!(f, "{hand} {finger}")
    }
}

/// Finger for an unshifted key on a US QWERTY board. Keys off the map
/// fall back to the left index finger.
pub fn qwerty_finger(base_key: char) -> FingerAssignment {
    use Finger::*;
    use Hand::*;

    match base_key {
        '`' | '1' | 'q' | 'a' | 'z' => FingerAssignment::new(Left, Pinky),
        '2' | 'w' | 's' | 'x' => FingerAssignment::new(Left, Ring),
        '3' | 'e' | 'd' | 'c' => FingerAssignment::new(Left, Middle),
        '4' | '5' | 'r' | 'f' | 'v' | 't' | 'g' | 'b' => FingerAssignment::new(Left, Index),
        '6' | '7' | 'y' | 'h' | 'n' | 'u' | 'j' | 'm' => FingerAssignment::new(Right, Index),
        '8' | 'i' | 'k' | ',' => FingerAssignment::new(Right, Middle),
        '9' | 'o' | 'l' | '.' => FingerAssignment::new(Right, Ring),
        '0' | '-' | '=' | 'p' | '[' | ']' | '\\' | ';' | '\'' | '/' => {
            FingerAssignment::new(Right, Pinky)
        }
        _ => FingerAssignment::new(Left, Index),
    }
}

/// The unshifted key that produces `ch` with Shift held, if any.
fn unshifted_symbol(ch: char) -> Option<char> {
    let base = match ch {
        '~' => '`',
        '!' => '1',
        '@' => '2',
        '#' => '3',
        '$' => '4',
        '%' => '5',
        '^' => '6',
        '&' => '7',
        '*' => '8',
        '(' => '9',
        ')' => '0',
        '_' => '-',
        '+' => '=',
        '{' => '[',
        '}' => ']',
        '|' => '\\',
        ':' => ';',
        '"' => '\'',
        '<' => ',',
        '>' => '.',
        '?' => '/',
        _ => return None,
    };
    Some(base)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyMeta {
    pub base_key: char,
    pub shifted: bool,
    pub is_letter: bool,
}

pub fn key_meta(ch: char) -> KeyMeta {
    if ch.is_ascii_alphabetic() {
        return KeyMeta {
            base_key: ch.to_ascii_lowercase(),
            shifted: ch.is_ascii_uppercase(),
            is_letter: true,
        };
    }
    match unshifted_symbol(ch) {
        Some(base_key) => KeyMeta {
            base_key,
            shifted: true,
            is_letter: false,
        },
        None => KeyMeta {
            base_key: ch,
            shifted: false,
            is_letter: false,
        },
    }
}

/// Hint shown next to a drill target: which finger to use and, for shifted
/// characters, which Shift key goes with it (the one on the finger's side).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FingerGuidance {
    pub finger: FingerAssignment,
    pub base_key: char,
    pub shift: Option<Hand>,
}

impl FingerGuidance {
    pub fn home_key(&self) -> char {
        self.finger.home_key()
    }
}

pub fn guidance(ch: char) -> FingerGuidance {
    let meta = key_meta(ch);
    let finger = qwerty_finger(meta.base_key);
    let shift = meta.shifted.then_some(finger.hand);
    FingerGuidance {
        finger,
        base_key: meta.base_key,
        shift,
    }
}

impl fmt::Display for FingerGuidance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (home {})", self.finger, self.home_key())?;
        match self.shift {
            Some(Hand::Left) => write!(f, " + left shift"),
            Some(Hand::Right) => write!(f, " + right shift"),
            None => Ok(()),
        }
    }
}
