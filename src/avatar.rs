//! Avatar rendering seam. The image generator is an external collaborator;
//! the engine only owns the seed and asks for a fresh render when it changes.

pub trait AvatarGenerator: Send + Sync {
    /// Must be deterministic for a given seed.
    fn render(&self, seed: &str) -> String;
}

const PALETTE: [&str; 6] = ["b6e3f4", "c0aede", "d1d4f9", "ffd5dc", "ffdfbf", "c5e8b7"];

/// Offline fallback: a flat SVG disc coloured from a stable hash of the seed.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonogramAvatar;

impl MonogramAvatar {
    fn fnv1a(seed: &str) -> u64 {
        seed.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
        })
    }
}

impl AvatarGenerator for MonogramAvatar {
    fn render(&self, seed: &str) -> String {
        let hash = Self::fnv1a(seed);
        let background = PALETTE[(hash % PALETTE.len() as u64) as usize];
        let foreground = format!("{:06x}", (hash >> 8) & 0x00ff_ffff);
        // `#` must be escaped inside a data URI.
        format!(
            "data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' width='128' height='128'>\
             <rect width='128' height='128' fill='%23{background}'/>\
             <circle cx='64' cy='64' r='40' fill='%23{foreground}'/></svg>"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_per_seed() {
        let avatar = MonogramAvatar;
        assert_eq!(avatar.render("emma"), avatar.render("emma"));
        assert_ne!(avatar.render("emma"), avatar.render("liam"));
        assert!(avatar.render("x").starts_with("data:image/svg+xml"));
    }
}
