//! Static descriptions for recommended crops

/// Text returned when a crop has no entry in the table
pub const UNKNOWN_CROP_INFO: &str = "Information not available.";

/// Crop name (lowercase) to growing-conditions summary, sorted by name
const CROP_INFO: &[(&str, &str)] = &[
    ("apple", "Needs cold climate with well-drained loamy soil."),
    ("coffee", "Thrives in tropical climate with high rainfall."),
    ("grapes", "Needs moderate rainfall and dry climate."),
    ("maize", "Thrives in warm climate with moderate rainfall and well-drained soil."),
    ("mango", "Prefers hot, humid climate; grows in alluvial soil."),
    ("mungbean", "Prefers warm climate; grows well in loamy soil."),
    ("orange", "Requires subtropical climate; grows in sandy loam soil."),
    ("rice", "Needs high humidity and rainfall; grows best in clayey or alluvial soil."),
    ("watermelon", "Thrives in warm climate and sandy soil."),
    ("wheat", "Requires cool weather and moderate rainfall."),
];

/// Result of a crop-info lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropInfo {
    Known(&'static str),
    Unknown,
}

impl CropInfo {
    /// Look up a crop by name, ignoring case and surrounding whitespace
    pub fn lookup(crop: &str) -> Self {
        let key = crop.trim().to_lowercase();
        CROP_INFO
            .binary_search_by(|(name, _)| (*name).cmp(key.as_str()))
            .map(|idx| CropInfo::Known(CROP_INFO[idx].1))
            .unwrap_or(CropInfo::Unknown)
    }

    /// Description text, or the fallback message for unknown crops
    pub fn text(&self) -> &'static str {
        match self {
            CropInfo::Known(text) => text,
            CropInfo::Unknown => UNKNOWN_CROP_INFO,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, CropInfo::Known(_))
    }
}

/// Capitalize the first character for display ("rice" -> "Rice")
pub fn display_name(crop: &str) -> String {
    let mut chars = crop.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(CROP_INFO.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn test_lookup_known_crop() {
        let info = CropInfo::lookup("rice");
        assert!(info.is_known());
        assert!(info.text().contains("high humidity"));
        assert_eq!(CropInfo::lookup("  Rice "), info);
    }

    #[test]
    fn test_missing_crop_falls_back() {
        let info = CropInfo::lookup("chickpea");
        assert_eq!(info, CropInfo::Unknown);
        assert_eq!(info.text(), "Information not available.");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("rice"), "Rice");
        assert_eq!(display_name("kidneybeans"), "Kidneybeans");
        assert_eq!(display_name(""), "");
    }
}
