use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Counters gathered while evaluating one force step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForceTally {
    pub contacts: usize,
    pub bonds: usize,
    pub broken_bonds: usize,
    pub field_particles: usize,
    /// Force terms dropped because an interaction property was undefined.
    pub skipped_terms: usize,
}

impl ForceTally {
    pub fn contact(skipped_terms: u32) -> Self {
        Self {
            contacts: 1,
            skipped_terms: skipped_terms as usize,
            ..Self::default()
        }
    }

    pub fn bond(broken: bool) -> Self {
        Self {
            bonds: 1,
            broken_bonds: usize::from(broken),
            ..Self::default()
        }
    }

    pub fn field_particle() -> Self {
        Self {
            field_particles: 1,
            ..Self::default()
        }
    }
}

impl Add for ForceTally {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            contacts: self.contacts + rhs.contacts,
            bonds: self.bonds + rhs.bonds,
            broken_bonds: self.broken_bonds + rhs.broken_bonds,
            field_particles: self.field_particles + rhs.field_particles,
            skipped_terms: self.skipped_terms + rhs.skipped_terms,
        }
    }
}

impl AddAssign for ForceTally {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for ForceTally {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, t| acc + t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_count_one_record() {
        assert_eq!(ForceTally::contact(2).contacts, 1);
        assert_eq!(ForceTally::contact(2).skipped_terms, 2);
        assert_eq!(ForceTally::bond(true).broken_bonds, 1);
        assert_eq!(ForceTally::bond(false).broken_bonds, 0);
        assert_eq!(ForceTally::field_particle().field_particles, 1);
    }

    #[test]
    fn add_assign_accumulates_each_field() {
        let mut tally = ForceTally::contact(1);
        tally += ForceTally::bond(true);
        assert_eq!(
            tally,
            ForceTally {
                contacts: 1,
                bonds: 1,
                broken_bonds: 1,
                field_particles: 0,
                skipped_terms: 1,
            }
        );
    }

    #[test]
    fn sum_of_empty_iterator_is_default() {
        let total: ForceTally = std::iter::empty().sum();
        assert_eq!(total, ForceTally::default());
    }

    #[test]
    fn sum_matches_repeated_addition() {
        let total: ForceTally = (0..4).map(|i| ForceTally::bond(i % 2 == 0)).sum();
        assert_eq!(total.bonds, 4);
        assert_eq!(total.broken_bonds, 2);
    }
}
