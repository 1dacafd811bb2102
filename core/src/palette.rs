//! Categorical colors keyed by shelter name.

use hashbrown::HashMap;

pub const TABLEAU10: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

/// Ordinal palette assigned in registry order, cycling after ten shelters.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    assigned: HashMap<String, &'static str>,
}

impl Palette {
    pub fn for_registry(registry: &[String]) -> Self {
        let assigned = registry
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), TABLEAU10[i % TABLEAU10.len()]))
            .collect();
        Self { assigned }
    }

    /// Names outside the registry still get a stable color from their bytes.
    pub fn color(&self, shelter: &str) -> &'static str {
        if let Some(&color) = self.assigned.get(shelter) {
            return color;
        }
        let hash = shelter
            .bytes()
            .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(usize::from(b)));
        TABLEAU10[hash % TABLEAU10.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_assignment() {
        let registry: Vec<String> = (0..12).map(|i| format!("S{i:02}")).collect();
        let palette = Palette::for_registry(&registry);
        assert_eq!(palette.color("S00"), TABLEAU10[0]);
        assert_eq!(palette.color("S03"), TABLEAU10[3]);
        assert_eq!(palette.color("S10"), TABLEAU10[0]);
    }

    #[test]
    fn test_unknown_name_is_stable() {
        let palette = Palette::for_registry(&[]);
        assert_eq!(palette.color("Elsewhere"), palette.color("Elsewhere"));
    }
}
