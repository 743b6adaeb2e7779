use lazy_static::lazy_static;
use rand::Rng;

lazy_static! {
    static ref PUSH_CHARS: Vec<char> =
        "-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz"
            .chars()
            .collect();
}

/// Generates 20-char document ids: 8 chars of base-64 encoded
/// timestamp followed by 12 random chars. Ids created in the same
/// millisecond increment the random tail so insertion order survives a
/// lexicographic sort.
pub struct UidGenerator {
    last_rand_chars: [usize; 12],
    last_push_time: u128,
}

impl Default for UidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UidGenerator {
    pub fn new() -> Self {
        UidGenerator {
            last_rand_chars: [0; 12],
            last_push_time: 0,
        }
    }

    pub fn generate(&mut self, now: u128) -> String {
        let duplicate_time = now == self.last_push_time;
        self.last_push_time = now;

        let mut time_stamp_chars: [char; 8] = ['0'; 8];
        let mut temp_now = now;
        for i in (0..8).rev() {
            time_stamp_chars[i] = PUSH_CHARS[(temp_now % 64) as usize];
            temp_now /= 64;
        }
        debug_assert!(temp_now == 0);

        let mut result = time_stamp_chars.iter().collect::<String>();

        if !duplicate_time {
            // The RNG is thread local, so it must not be held in the
            // generator itself: the store shares one generator across
            // worker threads.
            let mut rng = rand::thread_rng();
            for i in 0..12 {
                self.last_rand_chars[i] = rng.gen_range(0..64);
            }
        } else {
            self.increment_tail();
        }

        for &rand_char_idx in self.last_rand_chars.iter() {
            result.push(PUSH_CHARS[rand_char_idx]);
        }
        debug_assert_eq!(result.len(), 20);

        result
    }

    fn increment_tail(&mut self) {
        for i in (0..12).rev() {
            if self.last_rand_chars[i] != 63 {
                self.last_rand_chars[i] += 1;
                return;
            }
            self.last_rand_chars[i] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uid_length() {
        let mut uid_gen = UidGenerator::new();
        assert_eq!(uid_gen.generate(1632499259).len(), 20);
    }

    #[test]
    fn test_uid_uniqueness_same_millisecond() {
        let now = 1632499259;
        let mut uid_gen = UidGenerator::new();
        let mut uids = HashSet::new();
        for _ in 0..1000 {
            uids.insert(uid_gen.generate(now));
        }
        assert_eq!(uids.len(), 1000);
    }

    #[test]
    fn test_generator_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<UidGenerator>();
    }

    #[test]
    fn test_same_millisecond_ids_are_ordered() {
        let now = 1632499259;
        let mut uid_gen = UidGenerator::new();
        let first = uid_gen.generate(now);
        let second = uid_gen.generate(now);
        assert!(second > first);
    }
}
