use phf::{Map, phf_map};
use std::fmt;

/// Temperature of the normal state [K].
pub const NORMAL_TEMPERATURE: f64 = 273.15;
/// Pressure of the normal state [Pa].
pub const NORMAL_PRESSURE: f64 = 101_325.0;

pub const DEFAULT_T1: f64 = 0.0;
pub const DEFAULT_T2: f64 = 500.0;
pub const DEFAULT_P1: f64 = 0.0;
pub const DEFAULT_P2: f64 = 1_000_000.0;

/// Where a property is stored and how it is combined for a pair of materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyScope {
    /// Temperature/pressure dependent property of a single compound.
    Compound,
    /// Constant property of a single compound.
    Constant,
    /// Property of a pair of compounds.
    Interaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyType {
    Density,
    HeatCapacity,
    DynamicViscosity,
    ThermalConductivity,
    SaturatedVaporPressure,
    VaporHeatCapacity,
    VaporizationEnthalpy,
    YoungModulus,
    NormalStrength,
    TangentialStrength,
    PoissonRatio,
    SurfaceEnergy,
    AtomicVolume,
    SurfaceTension,
    TimeThermExpCoeff,
    YieldStrength,
    MolarMass,
    RestitutionCoefficient,
    SlidingFriction,
    RollingFriction,
    ContactAngle,
    DiffusionCoefficient,
}

static PROPERTY_KEYS: Map<&'static str, PropertyType> = phf_map! {
    "density" => PropertyType::Density,
    "heat_capacity" => PropertyType::HeatCapacity,
    "dynamic_viscosity" => PropertyType::DynamicViscosity,
    "thermal_conductivity" => PropertyType::ThermalConductivity,
    "saturated_vapor_pressure" => PropertyType::SaturatedVaporPressure,
    "vapor_heat_capacity" => PropertyType::VaporHeatCapacity,
    "vaporization_enthalpy" => PropertyType::VaporizationEnthalpy,
    "young_modulus" => PropertyType::YoungModulus,
    "normal_strength" => PropertyType::NormalStrength,
    "tangential_strength" => PropertyType::TangentialStrength,
    "poisson_ratio" => PropertyType::PoissonRatio,
    "surface_energy" => PropertyType::SurfaceEnergy,
    "atomic_volume" => PropertyType::AtomicVolume,
    "surface_tension" => PropertyType::SurfaceTension,
    "time_therm_exp_coeff" => PropertyType::TimeThermExpCoeff,
    "yield_strength" => PropertyType::YieldStrength,
    "molar_mass" => PropertyType::MolarMass,
    "restitution_coefficient" => PropertyType::RestitutionCoefficient,
    "sliding_friction" => PropertyType::SlidingFriction,
    "rolling_friction" => PropertyType::RollingFriction,
    "contact_angle" => PropertyType::ContactAngle,
    "diffusion_coefficient" => PropertyType::DiffusionCoefficient,
};

impl PropertyType {
    pub const ALL: [PropertyType; 22] = [
        PropertyType::Density,
        PropertyType::HeatCapacity,
        PropertyType::DynamicViscosity,
        PropertyType::ThermalConductivity,
        PropertyType::SaturatedVaporPressure,
        PropertyType::VaporHeatCapacity,
        PropertyType::VaporizationEnthalpy,
        PropertyType::YoungModulus,
        PropertyType::NormalStrength,
        PropertyType::TangentialStrength,
        PropertyType::PoissonRatio,
        PropertyType::SurfaceEnergy,
        PropertyType::AtomicVolume,
        PropertyType::SurfaceTension,
        PropertyType::TimeThermExpCoeff,
        PropertyType::YieldStrength,
        PropertyType::MolarMass,
        PropertyType::RestitutionCoefficient,
        PropertyType::SlidingFriction,
        PropertyType::RollingFriction,
        PropertyType::ContactAngle,
        PropertyType::DiffusionCoefficient,
    ];

    /// Looks a property up by its snake-case key (e.g. `young_modulus`).
    pub fn from_key(key: &str) -> Option<Self> {
        PROPERTY_KEYS.get(key).copied()
    }

    /// Looks a property up by its stable numeric identifier.
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.id() == id)
    }

    pub fn id(self) -> u32 {
        use PropertyType::*;
        match self {
            Density => 0,
            HeatCapacity => 1,
            DynamicViscosity => 2,
            ThermalConductivity => 3,
            SaturatedVaporPressure => 4,
            VaporHeatCapacity => 5,
            VaporizationEnthalpy => 6,
            YoungModulus => 7,
            NormalStrength => 8,
            TangentialStrength => 9,
            PoissonRatio => 10,
            SurfaceEnergy => 11,
            AtomicVolume => 12,
            SurfaceTension => 13,
            TimeThermExpCoeff => 14,
            YieldStrength => 15,
            MolarMass => 100,
            RestitutionCoefficient => 200,
            SlidingFriction => 201,
            RollingFriction => 202,
            ContactAngle => 203,
            DiffusionCoefficient => 204,
        }
    }

    pub fn scope(self) -> PropertyScope {
        match self.id() {
            0..=99 => PropertyScope::Compound,
            100..=199 => PropertyScope::Constant,
            _ => PropertyScope::Interaction,
        }
    }

    pub fn key(self) -> &'static str {
        PROPERTY_KEYS
            .entries()
            .find(|(_, p)| **p == self)
            .map(|(k, _)| *k)
            .unwrap_or("undefined")
    }

    pub fn name(self) -> &'static str {
        use PropertyType::*;
        match self {
            Density => "Density",
            HeatCapacity => "Heat capacity",
            DynamicViscosity => "Dynamic viscosity",
            ThermalConductivity => "Thermal conductivity",
            SaturatedVaporPressure => "Saturated vapor pressure",
            VaporHeatCapacity => "Vapor heat capacity",
            VaporizationEnthalpy => "Enthalpy of vaporization",
            YoungModulus => "Young modulus",
            NormalStrength => "Normal strength",
            TangentialStrength => "Tangential strength",
            PoissonRatio => "Poisson ratio",
            SurfaceEnergy => "Surface energy",
            AtomicVolume => "Atomic volume",
            SurfaceTension => "Surface tension",
            TimeThermExpCoeff => "Time-related therm. exp. coeff.",
            YieldStrength => "Yield strength",
            MolarMass => "Molar mass",
            RestitutionCoefficient => "Restitution coefficient",
            SlidingFriction => "Sliding friction",
            RollingFriction => "Rolling friction",
            ContactAngle => "Contact angle",
            DiffusionCoefficient => "Diffusion coefficient",
        }
    }

    pub fn units(self) -> &'static str {
        use PropertyType::*;
        match self {
            Density => "kg/m3",
            HeatCapacity | VaporHeatCapacity => "J/(kg*K)",
            DynamicViscosity => "Pa*s",
            ThermalConductivity => "W/(m*K)",
            SaturatedVaporPressure | YoungModulus | NormalStrength | TangentialStrength
            | YieldStrength => "Pa",
            VaporizationEnthalpy => "J/kg",
            PoissonRatio | RestitutionCoefficient | SlidingFriction | RollingFriction => "-",
            SurfaceEnergy => "J/m2",
            AtomicVolume => "m3/mol",
            SurfaceTension => "N/m",
            TimeThermExpCoeff => "1/(K*s)",
            MolarMass => "kg/mol",
            ContactAngle => "Deg",
            DiffusionCoefficient => "m2/s",
        }
    }

    /// Value used when a property has never been authored.
    pub fn default_value(self) -> f64 {
        use PropertyType::*;
        match self {
            Density => 1000.0,
            HeatCapacity => 1000.0,
            DynamicViscosity => 0.1,
            ThermalConductivity => 0.5,
            SaturatedVaporPressure => 0.0,
            VaporHeatCapacity => 1000.0,
            VaporizationEnthalpy => 2_260_000.0,
            YoungModulus => 1e9,
            NormalStrength => 1e7,
            TangentialStrength => 1e7,
            PoissonRatio => 0.2,
            SurfaceEnergy => 1.0,
            AtomicVolume => 2e-5,
            SurfaceTension => 0.7,
            TimeThermExpCoeff => 1.7e-5,
            YieldStrength => 20e9,
            MolarMass => 0.018,
            RestitutionCoefficient => 0.6,
            SlidingFriction => 0.45,
            RollingFriction => 0.05,
            ContactAngle => 45.0,
            DiffusionCoefficient => 2e-9,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name(), self.units())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_property_has_a_key_that_round_trips() {
        for property in PropertyType::ALL {
            assert_eq!(PropertyType::from_key(property.key()), Some(property));
        }
    }

    #[test]
    fn numeric_ids_are_stable_and_unique() {
        assert_eq!(PropertyType::YoungModulus.id(), 7);
        assert_eq!(PropertyType::SlidingFriction.id(), 201);
        assert_eq!(PropertyType::from_id(14), Some(PropertyType::TimeThermExpCoeff));
        assert_eq!(PropertyType::from_id(999), None);
    }

    #[test]
    fn scope_follows_id_ranges() {
        assert_eq!(PropertyType::Density.scope(), PropertyScope::Compound);
        assert_eq!(PropertyType::MolarMass.scope(), PropertyScope::Constant);
        assert_eq!(
            PropertyType::RollingFriction.scope(),
            PropertyScope::Interaction
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert_eq!(PropertyType::from_key("stiffness"), None);
    }

    #[test]
    fn display_includes_units() {
        assert_eq!(PropertyType::YoungModulus.to_string(), "Young modulus [Pa]");
    }
}
