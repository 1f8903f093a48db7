//! Flat parameter tables.
//!
//! Each app exposes its settings as `key -> u8`. A [`ParamSpec`] names one key
//! and its valid range so values can be clamped when written.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub key: u8,
    pub name: &'static str,
    pub min: u8,
    pub max: u8,
}

impl ParamSpec {
    pub const fn new(key: u8, name: &'static str, min: u8, max: u8) -> Self {
        Self { key, name, min, max }
    }

    pub fn clamp(&self, value: u8) -> u8 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Find the spec for `key` in a table.
pub fn lookup(table: &[ParamSpec], key: u8) -> Option<&ParamSpec> {
    table.iter().find(|spec| spec.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[ParamSpec] = &[ParamSpec::new(0, "run", 0, 1), ParamSpec::new(1, "bpm", 40, 240)];

    #[test]
    fn clamp_into_domain() {
        let bpm = lookup(TABLE, 1).unwrap();
        assert_eq!(bpm.clamp(10), 40);
        assert_eq!(bpm.clamp(250), 240);
        assert_eq!(bpm.clamp(128), 128);
        assert!(!bpm.contains(39));
    }

    #[test]
    fn unknown_key() {
        assert!(lookup(TABLE, 9).is_none());
    }
}
