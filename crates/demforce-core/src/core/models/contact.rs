use super::ids::ContactId;
use super::particle::Particle;
use super::pbc::PeriodicBoundaries;
use super::{PairError, check_pair};
use crate::core::interaction::resolver::{equivalent_mass, equivalent_radius};
use nalgebra::Vector3;
use slotmap::SlotMap;
use std::collections::HashMap;

/// Persistent state of one particle-particle contact.
///
/// `contact_vector` points from the source to the destination particle center. The
/// tangential overlap is the spring state of the friction model and survives from step to
/// step while the pair stays in contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactState {
    pub src: usize,
    pub dst: usize,
    pub contact_vector: Vector3<f64>,
    pub normal_overlap: f64,
    pub equiv_radius: f64,
    pub equiv_mass: f64,

    pub tang_overlap: Vector3<f64>,
    pub tang_force: Vector3<f64>,
    pub total_force: Vector3<f64>,
    pub moment_src: Vector3<f64>,
    pub moment_dst: Vector3<f64>,
}

impl ContactState {
    pub fn new(src: &Particle, dst: &Particle, src_index: usize, dst_index: usize) -> Self {
        Self {
            src: src_index,
            dst: dst_index,
            contact_vector: dst.coord - src.coord,
            normal_overlap: src.radius + dst.radius - (dst.coord - src.coord).norm(),
            equiv_radius: equivalent_radius(src.radius, dst.radius),
            equiv_mass: equivalent_mass(src.mass, dst.mass),
            tang_overlap: Vector3::zeros(),
            tang_force: Vector3::zeros(),
            total_force: Vector3::zeros(),
            moment_src: Vector3::zeros(),
            moment_dst: Vector3::zeros(),
        }
    }

    /// Sets the geometric part of the state from the current particle positions.
    pub fn update_geometry(&mut self, src: &Particle, dst: &Particle, pbc: &PeriodicBoundaries) {
        let (vector, overlap) = sphere_contact_geometry(src, dst, pbc);
        self.contact_vector = vector;
        self.normal_overlap = overlap;
    }
}

/// Center-to-center vector (source to destination) and normal overlap of two spheres.
pub fn sphere_contact_geometry(
    src: &Particle,
    dst: &Particle,
    pbc: &PeriodicBoundaries,
) -> (Vector3<f64>, f64) {
    let vector = pbc.minimum_image(dst.coord - src.coord);
    let overlap = src.radius + dst.radius - vector.norm();
    (vector, overlap)
}

/// Index key of an unordered particle pair.
fn pair_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Arena of live contacts, addressed by stable [`ContactId`] keys. A particle pair owns at
/// most one contact, whichever order its particles were given in.
#[derive(Debug, Clone, Default)]
pub struct ContactStore {
    contacts: SlotMap<ContactId, ContactState>,
    pair_index: HashMap<(usize, usize), ContactId>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a contact between two particles, or returns the existing one for that pair.
    pub fn open(
        &mut self,
        src: usize,
        dst: usize,
        particles: &[Particle],
        pbc: &PeriodicBoundaries,
    ) -> Result<ContactId, PairError> {
        check_pair(src, dst, particles.len())?;
        if let Some(&id) = self.pair_index.get(&pair_key(src, dst)) {
            return Ok(id);
        }
        let mut state = ContactState::new(&particles[src], &particles[dst], src, dst);
        state.update_geometry(&particles[src], &particles[dst], pbc);
        let id = self.contacts.insert(state);
        self.pair_index.insert(pair_key(src, dst), id);
        Ok(id)
    }

    pub fn close(&mut self, id: ContactId) -> Option<ContactState> {
        let state = self.contacts.remove(id)?;
        self.pair_index.remove(&pair_key(state.src, state.dst));
        Some(state)
    }

    pub fn find(&self, src: usize, dst: usize) -> Option<ContactId> {
        self.pair_index.get(&pair_key(src, dst)).copied()
    }

    pub fn get(&self, id: ContactId) -> Option<&ContactState> {
        self.contacts.get(id)
    }

    pub fn get_mut(&mut self, id: ContactId) -> Option<&mut ContactState> {
        self.contacts.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactId, &ContactState)> {
        self.contacts.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut ContactState> {
        self.contacts.values_mut()
    }

    /// Recomputes contact vectors and overlaps of every contact from particle positions.
    pub fn refresh_geometry(&mut self, particles: &[Particle], pbc: &PeriodicBoundaries) {
        for state in self.contacts.values_mut() {
            state.update_geometry(&particles[state.src], &particles[state.dst], pbc);
        }
    }

    /// Drops every contact for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&ContactState) -> bool) {
        let pair_index = &mut self.pair_index;
        self.contacts.retain(|_, state| {
            let kept = keep(state);
            if !kept {
                pair_index.remove(&pair_key(state.src, state.dst));
            }
            kept
        });
    }
}

/// Structure-of-arrays copy of a [`ContactStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactBuffers {
    pub ids: Vec<ContactId>,
    pub src: Vec<usize>,
    pub dst: Vec<usize>,
    pub contact_vectors: Vec<Vector3<f64>>,
    pub normal_overlaps: Vec<f64>,
    pub equiv_radii: Vec<f64>,
    pub equiv_masses: Vec<f64>,
    pub tang_overlaps: Vec<Vector3<f64>>,
    pub tang_forces: Vec<Vector3<f64>>,
    pub total_forces: Vec<Vector3<f64>>,
    pub moments_src: Vec<Vector3<f64>>,
    pub moments_dst: Vec<Vector3<f64>>,
}

impl ContactBuffers {
    pub fn from_store(store: &ContactStore) -> Self {
        let mut buffers = Self::default();
        for (id, state) in store.iter() {
            buffers.ids.push(id);
            buffers.push(state);
        }
        buffers
    }

    fn push(&mut self, state: &ContactState) {
        self.src.push(state.src);
        self.dst.push(state.dst);
        self.contact_vectors.push(state.contact_vector);
        self.normal_overlaps.push(state.normal_overlap);
        self.equiv_radii.push(state.equiv_radius);
        self.equiv_masses.push(state.equiv_mass);
        self.tang_overlaps.push(state.tang_overlap);
        self.tang_forces.push(state.tang_force);
        self.total_forces.push(state.total_force);
        self.moments_src.push(state.moment_src);
        self.moments_dst.push(state.moment_dst);
    }

    pub fn len(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> ContactState {
        ContactState {
            src: self.src[i],
            dst: self.dst[i],
            contact_vector: self.contact_vectors[i],
            normal_overlap: self.normal_overlaps[i],
            equiv_radius: self.equiv_radii[i],
            equiv_mass: self.equiv_masses[i],
            tang_overlap: self.tang_overlaps[i],
            tang_force: self.tang_forces[i],
            total_force: self.total_forces[i],
            moment_src: self.moments_src[i],
            moment_dst: self.moments_dst[i],
        }
    }

    /// Stores the geometry and evaluated part of a contact record back into slot `i`.
    #[inline]
    pub fn set(&mut self, i: usize, state: &ContactState) {
        self.contact_vectors[i] = state.contact_vector;
        self.normal_overlaps[i] = state.normal_overlap;
        self.tang_overlaps[i] = state.tang_overlap;
        self.tang_forces[i] = state.tang_force;
        self.total_forces[i] = state.total_force;
        self.moments_src[i] = state.moment_src;
        self.moments_dst[i] = state.moment_dst;
    }

    /// Copies every record back into the store it was taken from.
    pub fn write_back(&self, store: &mut ContactStore) {
        for (i, &id) in self.ids.iter().enumerate() {
            if let Some(state) = store.get_mut(id) {
                *state = self.get(i);
            }
        }
    }
}
