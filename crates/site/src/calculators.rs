//! Electrical engineering calculators.
//!
//! Every calculator is a pure function over `f64` inputs. [`Calculator`]
//! describes the form fields for each one so the HTML form, the form POST and
//! the JSON API share a single definition.

use std::collections::HashMap;

use serde::Serialize;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Errors raised for rejected calculator input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculatorError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0} must be a number")]
    NotANumber(&'static str),
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("{field} {message}")]
    OutOfRange {
        field: &'static str,
        message: &'static str,
    },
}

/// The available calculators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Calculator {
    ThreePhasePower,
    VoltageDrop,
    ShortCircuit,
    BusbarSize,
    CableCurrent,
}

/// One input on a calculator form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    /// Pre-filled example value.
    pub example: &'static str,
}

impl Field {
    const fn new(
        name: &'static str,
        label: &'static str,
        unit: &'static str,
        example: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            unit,
            example,
        }
    }
}

/// One line of a calculation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultLine {
    pub label: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

impl ResultLine {
    const fn new(label: &'static str, value: f64, unit: &'static str) -> Self {
        Self { label, value, unit }
    }

    /// Value rounded for display.
    #[must_use]
    pub fn display_value(&self) -> String {
        format!("{:.2}", self.value)
    }
}

/// Output of a calculator run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    pub calculator: Calculator,
    pub results: Vec<ResultLine>,
    /// Free-text recommendation, e.g. a suggested busbar.
    pub note: Option<String>,
}

impl Calculator {
    pub const ALL: [Self; 5] = [
        Self::ThreePhasePower,
        Self::VoltageDrop,
        Self::ShortCircuit,
        Self::BusbarSize,
        Self::CableCurrent,
    ];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::ThreePhasePower => "three-phase-power",
            Self::VoltageDrop => "voltage-drop",
            Self::ShortCircuit => "short-circuit",
            Self::BusbarSize => "busbar-size",
            Self::CableCurrent => "cable-current",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ThreePhasePower => "Three-phase power",
            Self::VoltageDrop => "Voltage drop",
            Self::ShortCircuit => "Transformer short-circuit current",
            Self::BusbarSize => "Busbar sizing",
            Self::CableCurrent => "Load current",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ThreePhasePower => {
                "Real and apparent power of a balanced three-phase load from line voltage, current and power factor."
            }
            Self::VoltageDrop => {
                "Voltage drop along a cable run for single- or three-phase circuits."
            }
            Self::ShortCircuit => {
                "Prospective fault current at the secondary terminals of a transformer."
            }
            Self::BusbarSize => {
                "Copper busbar cross-section for a rated current and design current density."
            }
            Self::CableCurrent => "Line current drawn by a three-phase load of known power.",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }

    #[must_use]
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::ThreePhasePower => const { &[
                Field::new("voltage", "Line voltage", "V", "400"),
                Field::new("current", "Line current", "A", "100"),
                Field::new("power_factor", "Power factor", "", "0.85"),
            ] },
            Self::VoltageDrop => const { &[
                Field::new("phases", "Phases (1 or 3)", "", "3"),
                Field::new("voltage", "Supply voltage", "V", "400"),
                Field::new("current", "Load current", "A", "100"),
                Field::new("resistance", "Conductor resistance", "Ω/km", "0.524"),
                Field::new("length", "Cable length", "m", "50"),
            ] },
            Self::ShortCircuit => const { &[
                Field::new("transformer_kva", "Transformer rating", "kVA", "1000"),
                Field::new("voltage", "Secondary voltage", "V", "400"),
                Field::new("impedance_percent", "Impedance", "%", "5"),
            ] },
            Self::BusbarSize => const { &[
                Field::new("current", "Rated current", "A", "1000"),
                Field::new("current_density", "Current density", "A/mm²", "2"),
            ] },
            Self::CableCurrent => const { &[
                Field::new("power_kw", "Load power", "kW", "55"),
                Field::new("voltage", "Line voltage", "V", "400"),
                Field::new("power_factor", "Power factor", "", "0.85"),
            ] },
        }
    }

    /// Run the calculator on named numeric inputs.
    ///
    /// # Errors
    ///
    /// Returns [`CalculatorError`] for missing, non-finite or out-of-range input.
    pub fn compute(self, inputs: &HashMap<String, f64>) -> Result<Calculation, CalculatorError> {
        let get = |name: &'static str| -> Result<f64, CalculatorError> {
            let value = *inputs.get(name).ok_or(CalculatorError::Missing(name))?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(CalculatorError::NotANumber(name))
            }
        };

        let (results, note) = match self {
            Self::ThreePhasePower => {
                let r = three_phase_power(get("voltage")?, get("current")?, get("power_factor")?)?;
                (
                    vec![
                        ResultLine::new("Real power", r.kw, "kW"),
                        ResultLine::new("Apparent power", r.kva, "kVA"),
                        ResultLine::new("Reactive power", r.kvar, "kvar"),
                    ],
                    None,
                )
            }
            Self::VoltageDrop => {
                let phases = match get("phases")? {
                    p if (p - 1.0).abs() < f64::EPSILON => Phases::Single,
                    p if (p - 3.0).abs() < f64::EPSILON => Phases::Three,
                    _ => {
                        return Err(CalculatorError::OutOfRange {
                            field: "phases",
                            message: "must be 1 or 3",
                        });
                    }
                };
                let r = voltage_drop(
                    phases,
                    get("current")?,
                    get("resistance")?,
                    get("length")?,
                    get("voltage")?,
                )?;
                let note = (r.percent > 5.0)
                    .then(|| "Drop exceeds 5%: consider a larger conductor.".to_owned());
                (
                    vec![
                        ResultLine::new("Voltage drop", r.drop_volts, "V"),
                        ResultLine::new("Voltage drop", r.percent, "%"),
                    ],
                    note,
                )
            }
            Self::ShortCircuit => {
                let r = short_circuit(
                    get("transformer_kva")?,
                    get("voltage")?,
                    get("impedance_percent")?,
                )?;
                (
                    vec![
                        ResultLine::new("Full-load current", r.full_load_amps, "A"),
                        ResultLine::new("Fault current", r.fault_ka, "kA"),
                        ResultLine::new("Fault level", r.fault_mva, "MVA"),
                    ],
                    None,
                )
            }
            Self::BusbarSize => {
                let r = busbar_size(get("current")?, get("current_density")?)?;
                let note = Some(r.suggested.map_or_else(
                    || "No single standard bar is large enough: use parallel bars.".to_owned(),
                    |bar| {
                        format!(
                            "Suggested copper bar: {} × {} mm ({} mm²)",
                            bar.width_mm,
                            bar.thickness_mm,
                            bar.area_mm2()
                        )
                    },
                ));
                (
                    vec![ResultLine::new("Required cross-section", r.required_mm2, "mm²")],
                    note,
                )
            }
            Self::CableCurrent => {
                let amps = cable_current(get("power_kw")?, get("voltage")?, get("power_factor")?)?;
                (vec![ResultLine::new("Line current", amps, "A")], None)
            }
        };

        Ok(Calculation {
            calculator: self,
            results,
            note,
        })
    }

    /// Parse raw form values for this calculator's fields. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CalculatorError::Missing`] or [`CalculatorError::NotANumber`].
    pub fn parse_form(
        self,
        form: &HashMap<String, String>,
    ) -> Result<HashMap<String, f64>, CalculatorError> {
        self.fields()
            .iter()
            .map(|field| {
                let raw = form
                    .get(field.name)
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .ok_or(CalculatorError::Missing(field.name))?;
                let value: f64 = raw
                    .parse()
                    .map_err(|_| CalculatorError::NotANumber(field.name))?;
                Ok((field.name.to_owned(), value))
            })
            .collect()
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, CalculatorError> {
    if !value.is_finite() {
        Err(CalculatorError::NotANumber(name))
    } else if value <= 0.0 {
        Err(CalculatorError::NotPositive(name))
    } else {
        Ok(value)
    }
}

fn power_factor(value: f64) -> Result<f64, CalculatorError> {
    let pf = positive("power_factor", value)?;
    if pf > 1.0 {
        return Err(CalculatorError::OutOfRange {
            field: "power_factor",
            message: "must be between 0 and 1",
        });
    }
    Ok(pf)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerResult {
    pub kw: f64,
    pub kva: f64,
    pub kvar: f64,
}

/// kW = √3·V·I·PF / 1000, kVA = √3·V·I / 1000.
///
/// # Errors
///
/// Rejects non-positive inputs and power factors above 1.
pub fn three_phase_power(
    voltage: f64,
    current: f64,
    pf: f64,
) -> Result<PowerResult, CalculatorError> {
    let voltage = positive("voltage", voltage)?;
    let current = positive("current", current)?;
    let pf = power_factor(pf)?;

    let kva = SQRT_3 * voltage * current / 1000.0;
    let kw = kva * pf;
    let kvar = (kva.mul_add(kva, -(kw * kw))).max(0.0).sqrt();
    Ok(PowerResult { kw, kva, kvar })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phases {
    Single,
    Three,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageDropResult {
    pub drop_volts: f64,
    pub percent: f64,
}

/// Three-phase: ΔV = √3·I·R·L/1000. Single-phase: ΔV = 2·I·R·L/1000.
/// `resistance` is in Ω/km and `length` in metres.
///
/// # Errors
///
/// Rejects non-positive inputs.
pub fn voltage_drop(
    phases: Phases,
    current: f64,
    resistance: f64,
    length: f64,
    voltage: f64,
) -> Result<VoltageDropResult, CalculatorError> {
    let current = positive("current", current)?;
    let resistance = positive("resistance", resistance)?;
    let length = positive("length", length)?;
    let voltage = positive("voltage", voltage)?;

    let factor = match phases {
        Phases::Single => 2.0,
        Phases::Three => SQRT_3,
    };
    let drop_volts = factor * current * resistance * length / 1000.0;
    Ok(VoltageDropResult {
        drop_volts,
        percent: drop_volts / voltage * 100.0,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShortCircuitResult {
    pub full_load_amps: f64,
    pub fault_ka: f64,
    pub fault_mva: f64,
}

/// I_sc (kA) = kVA / (√3·V·Z%/100), assuming an infinite upstream source.
///
/// # Errors
///
/// Rejects non-positive inputs and impedances above 100%.
pub fn short_circuit(
    transformer_kva: f64,
    voltage: f64,
    impedance_percent: f64,
) -> Result<ShortCircuitResult, CalculatorError> {
    let kva = positive("transformer_kva", transformer_kva)?;
    let voltage = positive("voltage", voltage)?;
    let z = positive("impedance_percent", impedance_percent)?;
    if z > 100.0 {
        return Err(CalculatorError::OutOfRange {
            field: "impedance_percent",
            message: "must be at most 100",
        });
    }

    let full_load_ka = kva / (SQRT_3 * voltage);
    let fault_ka = full_load_ka / (z / 100.0);
    Ok(ShortCircuitResult {
        full_load_amps: full_load_ka * 1000.0,
        fault_ka,
        fault_mva: kva / 1000.0 / (z / 100.0),
    })
}

/// A standard rectangular copper busbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusbarProfile {
    pub width_mm: u32,
    pub thickness_mm: u32,
}

impl BusbarProfile {
    #[must_use]
    pub const fn new(width_mm: u32, thickness_mm: u32) -> Self {
        Self {
            width_mm,
            thickness_mm,
        }
    }

    #[must_use]
    pub const fn area_mm2(self) -> u32 {
        self.width_mm * self.thickness_mm
    }
}

/// Stocked copper bar sizes, smallest cross-section first.
pub const STANDARD_BUSBARS: &[BusbarProfile] = &[
    BusbarProfile::new(20, 5),
    BusbarProfile::new(25, 5),
    BusbarProfile::new(30, 5),
    BusbarProfile::new(40, 5),
    BusbarProfile::new(50, 5),
    BusbarProfile::new(30, 10),
    BusbarProfile::new(40, 10),
    BusbarProfile::new(50, 10),
    BusbarProfile::new(60, 10),
    BusbarProfile::new(80, 10),
    BusbarProfile::new(100, 10),
    BusbarProfile::new(120, 10),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BusbarResult {
    pub required_mm2: f64,
    pub suggested: Option<BusbarProfile>,
}

/// Cross-section = I / J, then the smallest standard bar at least that large.
///
/// # Errors
///
/// Rejects non-positive inputs.
pub fn busbar_size(current: f64, current_density: f64) -> Result<BusbarResult, CalculatorError> {
    let current = positive("current", current)?;
    let density = positive("current_density", current_density)?;

    let required_mm2 = current / density;
    let suggested = STANDARD_BUSBARS
        .iter()
        .copied()
        .find(|bar| f64::from(bar.area_mm2()) >= required_mm2);
    Ok(BusbarResult {
        required_mm2,
        suggested,
    })
}

/// I = kW·1000 / (√3·V·PF).
///
/// # Errors
///
/// Rejects non-positive inputs and power factors above 1.
pub fn cable_current(power_kw: f64, voltage: f64, pf: f64) -> Result<f64, CalculatorError> {
    let power_kw = positive("power_kw", power_kw)?;
    let voltage = positive("voltage", voltage)?;
    let pf = power_factor(pf)?;
    Ok(power_kw * 1000.0 / (SQRT_3 * voltage * pf))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_three_phase_power() {
        let r = three_phase_power(400.0, 100.0, 0.8).unwrap();
        assert!(close(r.kva, 69.28));
        assert!(close(r.kw, 55.43));
        assert!(close(r.kvar, 41.57));
    }

    #[test]
    fn test_power_factor_bounds() {
        assert_eq!(
            three_phase_power(400.0, 100.0, 0.0),
            Err(CalculatorError::NotPositive("power_factor"))
        );
        assert!(matches!(
            three_phase_power(400.0, 100.0, 1.2),
            Err(CalculatorError::OutOfRange { field: "power_factor", .. })
        ));
    }

    #[test]
    fn test_voltage_drop_three_and_single_phase() {
        let three = voltage_drop(Phases::Three, 100.0, 0.524, 50.0, 400.0).unwrap();
        assert!(close(three.drop_volts, 4.54));
        assert!(close(three.percent, 1.13));

        let single = voltage_drop(Phases::Single, 10.0, 7.41, 30.0, 230.0).unwrap();
        assert!(close(single.drop_volts, 4.45));
    }

    #[test]
    fn test_short_circuit() {
        let r = short_circuit(1000.0, 400.0, 5.0).unwrap();
        assert!(close(r.full_load_amps, 1443.38));
        assert!(close(r.fault_ka, 28.87));
        assert!(close(r.fault_mva, 20.0));
    }

    #[test]
    fn test_busbar_suggests_smallest_sufficient_bar() {
        let r = busbar_size(1000.0, 2.0).unwrap();
        assert!(close(r.required_mm2, 500.0));
        assert_eq!(
            r.suggested,
            Some(BusbarProfile::new(50, 10))
        );

        assert_eq!(busbar_size(5000.0, 1.0).unwrap().suggested, None);
    }

    #[test]
    fn test_cable_current() {
        assert!(close(cable_current(55.0, 400.0, 0.85).unwrap(), 93.40));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert_eq!(
            cable_current(f64::NAN, 400.0, 0.9),
            Err(CalculatorError::NotANumber("power_kw"))
        );
    }

    #[test]
    fn test_compute_from_form() {
        let form: HashMap<String, String> = [
            ("phases", "3"),
            ("voltage", "400"),
            ("current", " 100 "),
            ("resistance", "0.524"),
            ("length", "50"),
            ("ignored", "x"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let calc = Calculator::VoltageDrop;
        let inputs = calc.parse_form(&form).unwrap();
        let out = calc.compute(&inputs).unwrap();
        assert_eq!(out.results.len(), 2);
        assert_eq!(out.results[0].display_value(), "4.54");
        assert_eq!(out.note, None);
    }

    #[test]
    fn test_parse_form_errors() {
        let mut form = HashMap::new();
        form.insert("current".to_string(), "abc".to_string());
        assert_eq!(
            Calculator::BusbarSize.parse_form(&form),
            Err(CalculatorError::NotANumber("current"))
        );
        form.insert("current".to_string(), "10".to_string());
        assert_eq!(
            Calculator::BusbarSize.parse_form(&form),
            Err(CalculatorError::Missing("current_density"))
        );
    }

    #[test]
    fn test_phases_must_be_one_or_three() {
        let inputs: HashMap<String, f64> = [
            ("phases", 2.0),
            ("voltage", 400.0),
            ("current", 10.0),
            ("resistance", 1.0),
            ("length", 10.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        assert!(matches!(
            Calculator::VoltageDrop.compute(&inputs),
            Err(CalculatorError::OutOfRange { field: "phases", .. })
        ));
    }

    #[test]
    fn test_slug_round_trip() {
        for calc in Calculator::ALL {
            assert_eq!(Calculator::from_slug(calc.slug()), Some(calc));
        }
        assert_eq!(Calculator::from_slug("ohms-law"), None);
    }
}
