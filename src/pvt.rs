use compact_str::CompactString;

/// Process, voltage and temperature at which a library is characterized or a design is analyzed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pvt {
    pub process: f32,
    pub voltage: f32,
    pub temperature: f32,
}

impl Pvt {
    pub fn new(process: f32, voltage: f32, temperature: f32) -> Self {
        Self {
            process,
            voltage,
            temperature,
        }
    }
}

impl Default for Pvt {
    fn default() -> Self {
        Self::new(1.0, 1.0, 25.0)
    }
}

/// A named [`Pvt`], as declared by a Liberty `operating_conditions` group.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatingConditions {
    pub name: CompactString,
    pub pvt: Pvt,
}

impl OperatingConditions {
    pub fn new(name: &str, pvt: Pvt) -> Self {
        Self { name: name.into(), pvt }
    }
}
