//! ekos-directory: City directory for report numbering
//!
//! The directory maps a human city name to the fixed 3-letter code that
//! appears in report numbers. It is static configuration: built once at
//! startup (built-in province table plus any configured extras) and
//! shared read-only afterwards.
//!
//! Lookups are exact-name matches. Names that are not in the directory
//! have no code; callers decide whether that is an error
//! ([`CityDirectory::require`]) or whether the fallback code `XXX` is
//! acceptable.
//!
//! # Example
//!
//! ```
//! use ekos_directory::CityDirectory;
//! use ekos_types::CityCode;
//!
//! let directory = CityDirectory::turkey()
//!     .with_city("Istanbul", CityCode::new("IST").unwrap()); // ASCII alias
//!
//! assert_eq!(directory.code_for("Ankara").unwrap().as_str(), "ANK");
//! assert_eq!(directory.code_for("Istanbul"), directory.code_for("İstanbul"));
//! assert!(directory.code_for("Atlantis").is_none());
//! ```

use std::collections::HashMap;

use ekos_types::CityCode;
use serde::{Deserialize, Serialize};

/// Built-in table: the 81 provinces of Türkiye.
const TURKISH_PROVINCES: &[(&str, &str)] = &[
    ("Adana", "ADA"),
    ("Adıyaman", "ADY"),
    ("Afyonkarahisar", "AFY"),
    ("Ağrı", "AGR"),
    ("Amasya", "AMS"),
    ("Ankara", "ANK"),
    ("Antalya", "ANT"),
    ("Artvin", "ART"),
    ("Aydın", "AYD"),
    ("Balıkesir", "BAL"),
    ("Bilecik", "BLC"),
    ("Bingöl", "BNG"),
    ("Bitlis", "BTL"),
    ("Bolu", "BOL"),
    ("Burdur", "BRD"),
    ("Bursa", "BRS"),
    ("Çanakkale", "CNK"),
    ("Çankırı", "CKR"),
    ("Çorum", "CRM"),
    ("Denizli", "DNZ"),
    ("Diyarbakır", "DYB"),
    ("Edirne", "EDR"),
    ("Elazığ", "ELZ"),
    ("Erzincan", "ERZ"),
    ("Erzurum", "ERM"),
    ("Eskişehir", "ESK"),
    ("Gaziantep", "GAZ"),
    ("Giresun", "GRS"),
    ("Gümüşhane", "GMS"),
    ("Hakkari", "HKR"),
    ("Hatay", "HTY"),
    ("Isparta", "ISP"),
    ("Mersin", "MRS"),
    ("İstanbul", "IST"),
    ("İzmir", "IZM"),
    ("Kars", "KRS"),
    ("Kastamonu", "KST"),
    ("Kayseri", "KYS"),
    ("Kırklareli", "KLR"),
    ("Kırşehir", "KRH"),
    ("Kocaeli", "KOC"),
    ("Konya", "KON"),
    ("Kütahya", "KTH"),
    ("Malatya", "MLT"),
    ("Manisa", "MNS"),
    ("Kahramanmaraş", "KMR"),
    ("Mardin", "MRD"),
    ("Muğla", "MGL"),
    ("Muş", "MUS"),
    ("Nevşehir", "NVS"),
    ("Niğde", "NGD"),
    ("Ordu", "ORD"),
    ("Rize", "RIZ"),
    ("Sakarya", "SKR"),
    ("Samsun", "SMS"),
    ("Siirt", "SRT"),
    ("Sinop", "SNP"),
    ("Sivas", "SVS"),
    ("Tekirdağ", "TKR"),
    ("Tokat", "TKT"),
    ("Trabzon", "TRB"),
    ("Tunceli", "TNC"),
    ("Şanlıurfa", "SUR"),
    ("Uşak", "USK"),
    ("Van", "VAN"),
    ("Yozgat", "YZG"),
    ("Zonguldak", "ZNG"),
    ("Aksaray", "AKS"),
    ("Bayburt", "BYB"),
    ("Karaman", "KRM"),
    ("Kırıkkale", "KRK"),
    ("Batman", "BTM"),
    ("Şırnak", "SRN"),
    ("Bartın", "BRT"),
    ("Ardahan", "ARD"),
    ("Iğdır", "IGD"),
    ("Yalova", "YLV"),
    ("Karabük", "KRB"),
    ("Kilis", "KLS"),
    ("Osmaniye", "OSM"),
    ("Düzce", "DZC"),
];

/// Maps city names to report-number city codes.
///
/// Several names may share one code (aliases); each name has exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityDirectory {
    codes: HashMap<String, CityCode>,
}

/// A directory entry, as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub code: CityCode,
}

impl CityDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding the built-in province table.
    pub fn turkey() -> Self {
        let codes = TURKISH_PROVINCES
            .iter()
            .filter_map(|(name, code)| Some(((*name).to_string(), CityCode::new(code).ok()?)))
            .collect();
        Self { codes }
    }

    /// Adds or replaces an entry.
    ///
    /// This is a builder method that takes ownership and returns `self`
    /// for chaining.
    pub fn with_city(mut self, name: impl Into<String>, code: CityCode) -> Self {
        self.insert(name, code);
        self
    }

    /// Adds or replaces an entry, returning the code it replaced.
    pub fn insert(&mut self, name: impl Into<String>, code: CityCode) -> Option<CityCode> {
        self.codes.insert(name.into(), code)
    }

    /// Returns the code for `name`, if the city is known.
    pub fn code_for(&self, name: &str) -> Option<CityCode> {
        self.codes.get(name).copied()
    }

    /// Returns the code for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::CityNotFound`] if the name has no entry.
    pub fn require(&self, name: &str) -> Result<CityCode, DirectoryError> {
        self.code_for(name)
            .ok_or_else(|| DirectoryError::CityNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codes.contains_key(name)
    }

    /// Lists all entries sorted by name.
    pub fn cities(&self) -> Vec<City> {
        let mut cities: Vec<City> = self
            .codes
            .iter()
            .map(|(name, code)| City {
                name: name.clone(),
                code: *code,
            })
            .collect();
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        cities
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Errors that can occur during directory lookups.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The city name has no directory entry.
    #[error("city not found: {0}")]
    CityNotFound(String),
}
