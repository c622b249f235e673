use crate::types::Workout;

/// In-memory, insertion-ordered list of the session's workouts.
#[derive(Debug, Clone, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    pub const fn new() -> Self {
        Self {
            workouts: Vec::new(),
        }
    }

    pub fn append(&mut self, workout: Workout) {
        self.workouts.push(workout);
    }

    /// Linear scan; `None` when nothing matches.
    pub fn find_by_id(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn last(&self) -> Option<&Workout> {
        self.workouts.last()
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
    }
}

impl Extend<Workout> for WorkoutStore {
    fn extend<T: IntoIterator<Item = Workout>>(&mut self, iter: T) {
        for w in iter {
            self.append(w);
        }
    }
}
