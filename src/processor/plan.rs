use crate::config::{EncoderOptions, FormatSpec, SizeSpec};

/// A single planned output, not yet rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSpec {
    /// The key the variant is recorded under in the asset's formats.
    pub key: String,

    /// The format name as configured, e.g. `jpg`.
    pub format: String,

    pub size_name: String,

    pub width: u32,

    pub options: EncoderOptions,
}

/// An insertion ordered set of variants keyed by `VariantSpec::key`.
///
/// Inserting an existing key replaces the entry in place, so the
/// original position is kept and the last write wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantPlan {
    variants: Vec<VariantSpec>,
}

impl VariantPlan {
    /// Builds the cross product of `formats` and `sizes`.
    ///
    /// Keys are `{size}_{format}`, or just `{size}` when `unique_size` is set.
    /// The latter only makes sense with a single format, otherwise the
    /// formats overwrite one another.
    pub fn build(formats: &[FormatSpec], sizes: &[SizeSpec], unique_size: bool) -> Self {
        let mut plan = Self::default();

        for format in formats {
            for size in sizes {
                let key = if unique_size {
                    size.name.clone()
                } else {
                    format!("{}_{}", size.name, format.name)
                };

                plan.insert(VariantSpec {
                    key,
                    format: format.name.clone(),
                    size_name: size.name.clone(),
                    width: size.width,
                    options: format.options,
                });
            }
        }

        plan
    }

    pub fn insert(&mut self, spec: VariantSpec) {
        match self.variants.iter_mut().find(|v| v.key == spec.key) {
            Some(existing) => *existing = spec,
            None => self.variants.push(spec),
        }
    }

    /// Unions two plans, entries of `other` win on key collisions.
    pub fn merge(mut self, other: VariantPlan) -> Self {
        for spec in other.variants {
            self.insert(spec);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&VariantSpec> {
        self.variants.iter().find(|v| v.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|v| v.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantSpec> {
        self.variants.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl IntoIterator for VariantPlan {
    type Item = VariantSpec;
    type IntoIter = std::vec::IntoIter<VariantSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.into_iter()
    }
}
