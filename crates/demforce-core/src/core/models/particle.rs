use nalgebra::Vector3;

/// Kinematic state of one spherical particle together with the per-step accumulators the
/// force models write into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub coord: Vector3<f64>,
    pub vel: Vector3<f64>,
    pub ang_vel: Vector3<f64>,
    pub radius: f64,
    pub mass: f64,
    pub temperature: f64,
    /// Index into the run's material list.
    pub material: usize,

    pub force: Vector3<f64>,
    pub moment: Vector3<f64>,
    pub heat_flux: f64,
}

impl Particle {
    /// Creates a particle at rest.
    ///
    /// # Arguments
    ///
    /// * `coord` - Center position [m].
    /// * `radius` - Radius [m].
    /// * `mass` - Mass [kg].
    /// * `material` - Index of the particle's compound in the run's material list.
    pub fn new(coord: Vector3<f64>, radius: f64, mass: f64, material: usize) -> Self {
        Self {
            coord,
            vel: Vector3::zeros(),
            ang_vel: Vector3::zeros(),
            radius,
            mass,
            temperature: crate::core::materials::properties::NORMAL_TEMPERATURE,
            material,
            force: Vector3::zeros(),
            moment: Vector3::zeros(),
            heat_flux: 0.0,
        }
    }

    pub fn with_velocity(mut self, vel: Vector3<f64>) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_angular_velocity(mut self, ang_vel: Vector3<f64>) -> Self {
        self.ang_vel = ang_vel;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    #[inline]
    pub fn clear_accumulators(&mut self) {
        self.force = Vector3::zeros();
        self.moment = Vector3::zeros();
        self.heat_flux = 0.0;
    }
}

/// Structure-of-arrays view of a particle set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleBuffers {
    pub coords: Vec<Vector3<f64>>,
    pub vels: Vec<Vector3<f64>>,
    pub ang_vels: Vec<Vector3<f64>>,
    pub radii: Vec<f64>,
    pub masses: Vec<f64>,
    pub temperatures: Vec<f64>,
    pub materials: Vec<usize>,
    pub forces: Vec<Vector3<f64>>,
    pub moments: Vec<Vector3<f64>>,
    pub heat_fluxes: Vec<f64>,
}

impl ParticleBuffers {
    pub fn from_particles(particles: &[Particle]) -> Self {
        Self {
            coords: particles.iter().map(|p| p.coord).collect(),
            vels: particles.iter().map(|p| p.vel).collect(),
            ang_vels: particles.iter().map(|p| p.ang_vel).collect(),
            radii: particles.iter().map(|p| p.radius).collect(),
            masses: particles.iter().map(|p| p.mass).collect(),
            temperatures: particles.iter().map(|p| p.temperature).collect(),
            materials: particles.iter().map(|p| p.material).collect(),
            forces: particles.iter().map(|p| p.force).collect(),
            moments: particles.iter().map(|p| p.moment).collect(),
            heat_fluxes: particles.iter().map(|p| p.heat_flux).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Gathers the record of particle `i`.
    #[inline]
    pub fn get(&self, i: usize) -> Particle {
        Particle {
            coord: self.coords[i],
            vel: self.vels[i],
            ang_vel: self.ang_vels[i],
            radius: self.radii[i],
            mass: self.masses[i],
            temperature: self.temperatures[i],
            material: self.materials[i],
            force: self.forces[i],
            moment: self.moments[i],
            heat_flux: self.heat_fluxes[i],
        }
    }

    pub fn clear_accumulators(&mut self) {
        self.forces.iter_mut().for_each(|f| *f = Vector3::zeros());
        self.moments.iter_mut().for_each(|m| *m = Vector3::zeros());
        self.heat_fluxes.iter_mut().for_each(|q| *q = 0.0);
    }

    pub fn to_particles(&self) -> Vec<Particle> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Particle> {
        vec![
            Particle::new(Vector3::new(0.0, 0.0, 0.0), 1e-3, 1e-6, 0)
                .with_velocity(Vector3::new(1.0, 0.0, 0.0)),
            Particle::new(Vector3::new(2e-3, 0.0, 0.0), 2e-3, 3e-6, 1)
                .with_angular_velocity(Vector3::new(0.0, 0.0, 5.0))
                .with_temperature(400.0),
        ]
    }

    #[test]
    fn buffers_gather_the_same_records() {
        let particles = sample();
        let buffers = ParticleBuffers::from_particles(&particles);
        assert_eq!(buffers.len(), 2);
        assert_eq!(buffers.to_particles(), particles);
    }

    #[test]
    fn clear_accumulators_resets_outputs_only() {
        let mut particles = sample();
        particles[0].force = Vector3::new(1.0, 2.0, 3.0);
        particles[0].heat_flux = 4.0;
        let mut buffers = ParticleBuffers::from_particles(&particles);

        particles[0].clear_accumulators();
        buffers.clear_accumulators();

        assert_eq!(particles[0].force, Vector3::zeros());
        assert_eq!(particles[0].heat_flux, 0.0);
        assert_eq!(particles[0].vel, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(buffers.get(0), particles[0]);
    }

    #[test]
    fn new_particle_starts_at_rest_at_normal_temperature() {
        let p = Particle::new(Vector3::zeros(), 1.0, 1.0, 0);
        assert_eq!(p.vel, Vector3::zeros());
        assert_eq!(p.temperature, 273.15);
    }
}
