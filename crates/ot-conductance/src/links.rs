//! Conductor implementations: linear/contact, radiation, heat pipe.

use ot_core::{SIGMA, interp_flat, interp_flat_slope};
use ot_network::{Conductor, ConductorKind};

use crate::error::{ConductanceError, ConductanceResult};
use crate::traits::{FlowDerivatives, PortTemps, ThermalLink};

/// Constant conductance (`linear` and `contact` conductors).
#[derive(Debug, Clone)]
pub struct LinearLink {
    name: String,
    /// W/K
    pub conductance: f64,
}

impl LinearLink {
    pub fn new(name: String, conductance: f64) -> Self {
        Self { name, conductance }
    }
}

impl ThermalLink for LinearLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn flow(&self, temps: PortTemps) -> f64 {
        self.conductance * (temps.from - temps.to)
    }

    fn derivatives(&self, _temps: PortTemps) -> FlowDerivatives {
        FlowDerivatives {
            d_from: self.conductance,
            d_to: -self.conductance,
        }
    }

    fn linearized_conductance(&self, _temps: PortTemps) -> f64 {
        self.conductance
    }
}

/// Grey-body radiative exchange `σ·ε·A·F·(T_from⁴ − T_to⁴)`.
#[derive(Debug, Clone)]
pub struct RadiationLink {
    name: String,
    /// m²
    pub area: f64,
    pub view_factor: f64,
    pub emissivity: f64,
}

impl RadiationLink {
    pub fn new(name: String, area: f64, view_factor: f64, emissivity: f64) -> Self {
        Self {
            name,
            area,
            view_factor,
            emissivity,
        }
    }

    /// `σ·ε·A·F` (W/K⁴).
    pub fn coefficient(&self) -> f64 {
        SIGMA * self.emissivity * self.area * self.view_factor
    }
}

impl ThermalLink for RadiationLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn flow(&self, temps: PortTemps) -> f64 {
        self.coefficient() * (temps.from.powi(4) - temps.to.powi(4))
    }

    fn derivatives(&self, temps: PortTemps) -> FlowDerivatives {
        let k = 4.0 * self.coefficient();
        FlowDerivatives {
            d_from: k * temps.from.powi(3),
            d_to: -k * temps.to.powi(3),
        }
    }

    /// Secant conductance `σεAF·(T_f² + T_t²)·(T_f + T_t)`; exact when multiplied by
    /// the temperature difference.
    fn linearized_conductance(&self, temps: PortTemps) -> f64 {
        let (a, b) = (temps.from, temps.to);
        self.coefficient() * (a * a + b * b) * (a + b)
    }
}

/// Heat pipe whose conductance is tabulated against the hotter endpoint.
#[derive(Debug, Clone)]
pub struct HeatPipeLink {
    name: String,
    /// `(T_K, G_W_per_K)` sorted by strictly increasing temperature.
    table: Vec<(f64, f64)>,
}

impl HeatPipeLink {
    pub fn new(name: String, table: Vec<(f64, f64)>) -> ConductanceResult<Self> {
        if table.len() < 2 || !ot_core::strictly_increasing(&table) {
            return Err(ConductanceError::NonPhysical {
                what: "heat pipe table must have >= 2 strictly increasing points",
            });
        }
        if table.iter().any(|p| !(p.1 > 0.0) || !p.0.is_finite()) {
            return Err(ConductanceError::NonPhysical {
                what: "heat pipe conductance must be > 0",
            });
        }
        Ok(Self { name, table })
    }

    /// Table conductance at `temperature` (flat outside the table).
    pub fn conductance_at(&self, temperature: f64) -> f64 {
        // `new` guarantees a non-empty table.
        interp_flat(&self.table, temperature).unwrap_or(self.table[0].1)
    }
}

impl ThermalLink for HeatPipeLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn flow(&self, temps: PortTemps) -> f64 {
        self.conductance_at(temps.hotter()) * (temps.from - temps.to)
    }

    fn derivatives(&self, temps: PortTemps) -> FlowDerivatives {
        let hot = temps.hotter();
        let g = self.conductance_at(hot);
        let dg = interp_flat_slope(&self.table, hot) * (temps.from - temps.to);
        if temps.from >= temps.to {
            FlowDerivatives {
                d_from: g + dg,
                d_to: -g,
            }
        } else {
            FlowDerivatives {
                d_from: g,
                d_to: -g + dg,
            }
        }
    }

    fn linearized_conductance(&self, temps: PortTemps) -> f64 {
        self.conductance_at(temps.hotter())
    }
}

fn required(conductor: &Conductor, field: &'static str, value: Option<f64>) -> ConductanceResult<f64> {
    value.ok_or_else(|| ConductanceError::MissingField {
        context: "conductor",
        id: conductor.id.clone(),
        field,
    })
}

/// Build the link model for a snapshot conductor.
pub fn compile_conductor(conductor: &Conductor) -> ConductanceResult<Box<dyn ThermalLink>> {
    let name = conductor.id.clone();
    Ok(match conductor.kind {
        ConductorKind::Linear | ConductorKind::Contact => Box::new(LinearLink::new(
            name,
            required(conductor, "conductance", conductor.conductance)?,
        )),
        ConductorKind::Radiation => Box::new(RadiationLink::new(
            name,
            required(conductor, "area", conductor.area)?,
            required(conductor, "view_factor", conductor.view_factor)?,
            required(conductor, "emissivity", conductor.emissivity)?,
        )),
        ConductorKind::HeatPipe => {
            let table = conductor.conductance_data.clone().ok_or_else(|| {
                ConductanceError::MissingField {
                    context: "conductor",
                    id: conductor.id.clone(),
                    field: "conductance_data",
                }
            })?;
            Box::new(HeatPipeLink::new(name, table)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn pipe() -> HeatPipeLink {
        HeatPipeLink::new(
            "hp".into(),
            vec![(250.0, 2.0), (300.0, 10.0), (350.0, 12.0)],
        )
        .unwrap()
    }

    #[test]
    fn linear_flow_sign() {
        let g = LinearLink::new("g".into(), 10.0);
        assert_eq!(g.flow(PortTemps::new(210.0, 200.0)), 100.0);
        assert_eq!(g.flow(PortTemps::new(200.0, 210.0)), -100.0);
    }

    #[test]
    fn radiation_exact_form() {
        let r = RadiationLink::new("r".into(), 2.0, 0.5, 0.8);
        let q = r.flow(PortTemps::new(300.0, 3.0));
        let expected = 5.670e-8 * 0.8 * 2.0 * 0.5 * (300.0_f64.powi(4) - 3.0_f64.powi(4));
        assert_relative_eq!(q, expected, max_relative = 1e-14);

        // The secant conductance reproduces the exact flow.
        let t = PortTemps::new(300.0, 3.0);
        assert_relative_eq!(r.linearized_conductance(t) * 297.0, q, max_relative = 1e-12);
    }

    #[test]
    fn heat_pipe_uses_hotter_end() {
        let hp = pipe();
        // Hot end at 300 K either way round.
        assert_eq!(hp.flow(PortTemps::new(300.0, 280.0)), 10.0 * 20.0);
        assert_eq!(hp.flow(PortTemps::new(280.0, 300.0)), -10.0 * 20.0);
        assert_eq!(hp.conductance_at(275.0), 6.0);
    }

    #[test]
    fn heat_pipe_rejects_bad_tables() {
        assert!(HeatPipeLink::new("x".into(), vec![(300.0, 1.0)]).is_err());
        assert!(HeatPipeLink::new("x".into(), vec![(300.0, 1.0), (300.0, 2.0)]).is_err());
        assert!(HeatPipeLink::new("x".into(), vec![(300.0, 1.0), (310.0, 0.0)]).is_err());
    }

    #[test]
    fn derivatives_match_finite_difference() {
        let links: Vec<Box<dyn ThermalLink>> = vec![
            Box::new(LinearLink::new("g".into(), 3.0)),
            Box::new(RadiationLink::new("r".into(), 1.0, 0.7, 0.9)),
            Box::new(pipe()),
        ];
        let t = PortTemps::new(290.0, 262.0);
        let h = 1e-4;
        for link in &links {
            let d = link.derivatives(t);
            let fd_from = (link.flow(PortTemps::new(t.from + h, t.to))
                - link.flow(PortTemps::new(t.from - h, t.to)))
                / (2.0 * h);
            let fd_to = (link.flow(PortTemps::new(t.from, t.to + h))
                - link.flow(PortTemps::new(t.from, t.to - h)))
                / (2.0 * h);
            assert_relative_eq!(d.d_from, fd_from, max_relative = 1e-6);
            assert_relative_eq!(d.d_to, fd_to, max_relative = 1e-6);
        }
    }

    proptest! {
        #[test]
        fn heat_pipe_exact_and_flat(idx in 0usize..3, below in 0.0f64..200.0, above in 0.0f64..1000.0) {
            let hp = pipe();
            let table = [(250.0, 2.0), (300.0, 10.0), (350.0, 12.0)];
            prop_assert_eq!(hp.conductance_at(table[idx].0), table[idx].1);
            prop_assert_eq!(hp.conductance_at(250.0 - below), 2.0);
            prop_assert_eq!(hp.conductance_at(350.0 + above), 12.0);
        }

        #[test]
        fn radiation_antisymmetric(a in 3.0f64..600.0, b in 3.0f64..600.0) {
            let r = RadiationLink::new("r".into(), 1.3, 0.4, 0.85);
            let q_ab = r.flow(PortTemps::new(a, b));
            let q_ba = r.flow(PortTemps::new(b, a));
            prop_assert_eq!(q_ab, -q_ba);
            if a > b + 1e-6 {
                prop_assert!(q_ab > 0.0);
            } else if b > a + 1e-6 {
                prop_assert!(q_ab < 0.0);
            }
        }
    }
}
