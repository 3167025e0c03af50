use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// IdGenerator trait for abstracting record identity generation
pub trait IdGenerator: Send + Sync {
    /// Generate a new identifier for a tank or reading
    fn new_id(&self) -> String;
}

/// Production implementation using random UUID v4 identifiers
#[derive(Debug, Clone, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIdGenerator {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Test implementation returning a fixed list of ids in sequence.
/// When the list is exhausted, it wraps around to the beginning.
#[derive(Debug, Clone)]
pub struct FixedIdGenerator {
    ids: Vec<String>,
    index: Arc<Mutex<usize>>,
}

impl FixedIdGenerator {
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            ids,
            index: Arc::new(Mutex::new(0)),
        }
    }

    pub fn from_strings(ids: &[&str]) -> Self {
        Self::new(ids.iter().map(|s| s.to_string()).collect())
    }

    pub fn current_index(&self) -> usize {
        *self.index.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl IdGenerator for FixedIdGenerator {
    fn new_id(&self) -> String {
        let mut index = self.index.lock().unwrap_or_else(|e| e.into_inner());
        let id = match self.ids.len() {
            0 => index.to_string(),
            len => self.ids[*index % len].clone(),
        };
        *index += 1;
        id
    }
}

/// Test implementation producing "{prefix}-1", "{prefix}-2", ...
/// Zero-padded so lexical order matches creation order.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: Arc<AtomicU64>,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}-{:06}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_generator() {
        let generator = RandomIdGenerator::new();

        let id1 = generator.new_id();
        let id2 = generator.new_id();

        assert!(Uuid::parse_str(&id1).is_ok());
        assert_ne!(id1, id2);
        assert_eq!(Uuid::parse_str(&id1).unwrap().get_version_num(), 4);
    }

    #[test]
    fn test_fixed_id_generator_sequence_wraps() {
        let generator = FixedIdGenerator::from_strings(&["tank-a", "tank-b"]);

        assert_eq!(generator.new_id(), "tank-a");
        assert_eq!(generator.new_id(), "tank-b");
        assert_eq!(generator.new_id(), "tank-a");
        assert_eq!(generator.current_index(), 3);
    }

    #[test]
    fn test_fixed_id_generator_empty_list() {
        let generator = FixedIdGenerator::new(Vec::new());
        assert_eq!(generator.new_id(), "0");
        assert_eq!(generator.new_id(), "1");
    }

    #[test]
    fn test_sequential_id_generator_orders_lexically() {
        let generator = SequentialIdGenerator::new("reading");
        let first = generator.new_id();
        let second = generator.new_id();

        assert_eq!(first, "reading-000001");
        assert_eq!(second, "reading-000002");
        assert!(first < second);
    }

    #[test]
    fn test_sequential_id_generator_shared_between_clones() {
        let generator = SequentialIdGenerator::new("t");
        let clone = generator.clone();
        generator.new_id();
        assert_eq!(clone.new_id(), "t-000002");
    }

    #[test]
    fn test_id_generator_trait_object() {
        let random_gen: Box<dyn IdGenerator> = Box::new(RandomIdGenerator::new());
        let fixed_gen: Box<dyn IdGenerator> = Box::new(FixedIdGenerator::from_strings(&["x"]));

        assert!(Uuid::parse_str(&random_gen.new_id()).is_ok());
        assert_eq!(fixed_gen.new_id(), "x");
    }
}
