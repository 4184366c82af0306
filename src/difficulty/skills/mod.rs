use self::{aim::Aim, rhythm::Rhythm, speed::Speed, strain::StrainSkill};

use super::object::DifficultyObject;

pub mod accuracy;
pub mod aim;
pub mod rhythm;
pub mod speed;
pub mod strain;

/// The sequence-based skills of the ruleset.
pub struct Skills {
    pub aim: StrainSkill<Aim>,
    pub speed: StrainSkill<Speed>,
    pub rhythm: StrainSkill<Rhythm>,
}

impl Skills {
    pub fn new() -> Self {
        Self {
            aim: StrainSkill::new(Aim::default()),
            speed: StrainSkill::new(Speed::default()),
            rhythm: StrainSkill::new(Rhythm::default()),
        }
    }

    /// Processes one difficulty object on every skill.
    ///
    /// Skills run in a fixed dependency order within the same pass: aim
    /// modulates on the tap strain of the same instant, so speed goes first.
    pub fn process(&mut self, curr: &DifficultyObject<'_>, objects: &[DifficultyObject<'_>]) {
        self.speed.process(curr, objects);
        self.rhythm.process(curr, objects);

        let tap_strain = self.speed.function().current_strain();
        self.aim.function_mut().set_concurrent_tap_strain(tap_strain);
        self.aim.process(curr, objects);
    }
}

impl Default for Skills {
    fn default() -> Self {
        Self::new()
    }
}
