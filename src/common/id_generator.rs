// src/common/id_generator.rs
//! User ids: `U_` followed by 8 Crockford Base32 characters (e.g. `U_K7NP3XQ2`)

use rand::Rng;

const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const ID_LENGTH: usize = 8;

pub fn generate_user_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_LENGTH)
        .map(|_| CROCKFORD_ALPHABET[rng.gen_range(0..CROCKFORD_ALPHABET.len())] as char)
        .collect();
    format!("U_{}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_user_id_shape() {
        let id = generate_user_id();
        assert_eq!(id.len(), 2 + ID_LENGTH);
        assert!(id.starts_with("U_"));
        assert!(id[2..].bytes().all(|b| CROCKFORD_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_ids_do_not_repeat() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_user_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
