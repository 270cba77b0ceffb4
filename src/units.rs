use compact_str::CompactString;

/// Display unit for one physical quantity.
///
/// Values are held in SI inside the crate; a unit only controls how they are
/// printed: `value / scale` with `digits` decimals, followed by nothing (the
/// suffix is reported separately, as in Liberty headers).
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    scale: f32,
    suffix: CompactString,
    digits: usize,
}

impl Unit {
    pub fn new(scale: f32, suffix: &str, digits: usize) -> Self {
        Self {
            scale,
            suffix: suffix.into(),
            digits,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn digits(&self) -> usize {
        self.digits
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    pub fn set_digits(&mut self, digits: usize) {
        self.digits = digits;
    }

    pub fn user_to_sta(&self, value: f32) -> f32 {
        value * self.scale
    }

    pub fn sta_to_user(&self, value: f32) -> f32 {
        value / self.scale
    }

    pub fn as_string(&self, value: f32) -> String {
        self.as_string_digits(value, self.digits)
    }

    pub fn as_string_digits(&self, value: f32, digits: usize) -> String {
        let user = self.sta_to_user(value);
        // Avoid printing "-0.000".
        let user = if user == 0.0 { 0.0 } else { user };
        format!("{:.*}", digits, user)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Units {
    pub time: Unit,
    pub capacitance: Unit,
    pub resistance: Unit,
    pub voltage: Unit,
    pub current: Unit,
    pub power: Unit,
    pub distance: Unit,
    /// Unitless quantities (path depth, normalized voltage).
    pub scalar: Unit,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            time: Unit::new(1e-9, "ns", 3),
            capacitance: Unit::new(1e-12, "pF", 3),
            resistance: Unit::new(1e3, "kohm", 3),
            voltage: Unit::new(1.0, "V", 3),
            current: Unit::new(1e-3, "mA", 3),
            power: Unit::new(1e-9, "nW", 3),
            distance: Unit::new(1e-6, "um", 3),
            scalar: Unit::new(1.0, "", 3),
        }
    }
}

impl Units {
    /// Units that print values exactly as stored. Handy when tables are kept in library units.
    pub fn unscaled() -> Self {
        Self {
            time: Unit::new(1.0, "ns", 3),
            capacitance: Unit::new(1.0, "pF", 3),
            resistance: Unit::new(1.0, "kohm", 3),
            voltage: Unit::new(1.0, "V", 3),
            current: Unit::new(1.0, "mA", 3),
            power: Unit::new(1.0, "nW", 3),
            distance: Unit::new(1.0, "um", 3),
            scalar: Unit::new(1.0, "", 3),
        }
    }

    pub fn find(&self, quantity: &str) -> Option<&Unit> {
        match quantity {
            "time" => Some(&self.time),
            "capacitance" => Some(&self.capacitance),
            "resistance" => Some(&self.resistance),
            "voltage" => Some(&self.voltage),
            "current" => Some(&self.current),
            "power" => Some(&self.power),
            "distance" => Some(&self.distance),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_scaled_values() {
        let units = Units::default();
        assert_eq!(units.time.as_string(1.5e-9), "1.500");
        assert_eq!(units.capacitance.as_string_digits(2e-15, 4), "0.0020");
        assert_eq!(units.time.as_string(-0.0), "0.000");
        assert_eq!(units.find("voltage").map(Unit::suffix), Some("V"));
    }
}
