//! Domain models for a registration session. An [`Entry`] is a plain data
//! holder: the form fills it in, the session store keeps it in order, and the
//! export layer flattens it into CSV rows. Quantities and payment amounts stay
//! as the strings the operator typed so sorting and export never reinterpret
//! them.

use std::fmt;

use uuid::Uuid;

/// Grade choices offered by the registration form.
pub const GRADES: &[&str] = &["9", "10", "11", "12", "Coach"];
/// Schools offered by the registration form.
pub const SCHOOLS: &[&str] = &["Ridgeline", "Preston", "Green Canyon", "Skyview", "Logan", "N/A"];
/// Sports offered by the registration form.
pub const SPORTS: &[&str] = &[
    "Football",
    "Tennis",
    "Soccer",
    "Volleyball",
    "Cross Country",
    "Golf",
    "Cheer",
];
/// Team levels offered by the registration form.
pub const TEAMS: &[&str] = &["Varsity", "JV", "Freshman", "N/A"];
/// Payment types offered by the registration form.
pub const PAYMENT_TYPES: &[&str] = &["Cash", "Card", "Check", "Did not pay"];

/// Value used for every package counter and the payment amount on a fresh
/// registration.
const ZERO: &str = "0";

/// Opaque identity of an entry. Lookups go through this id, never through the
/// control number, because the control number is editable business data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Mint a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the hyphenated form written by [`fmt::Display`].
    pub fn parse(raw: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw).map(Self)
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Debug, Clone)]
/// One registration: athlete, parent/guardian, package selections, payment and
/// notes.
pub struct Entry {
    id: EntryId,
    /// Human-facing sequential number. Assigned from the store's next number but
    /// freely editable afterwards, so uniqueness is not guaranteed.
    pub control_number: i64,
    pub first_name: String,
    pub last_name: String,
    pub jersey_number: String,
    pub grade: String,
    pub school: String,
    pub sport: String,
    pub team: String,
    pub parent_first_name: String,
    pub parent_last_name: String,
    pub parent_phone: String,
    pub parent_email: String,
    /// Package counters. Kept verbatim; nothing parses or sums them.
    pub eight_by_ten: String,
    pub team_photo: String,
    pub silver_package: String,
    pub digital_copy: String,
    pub banner: String,
    pub flex: String,
    pub frame: String,
    pub payment_type: String,
    pub payment_amount: String,
    /// Free-form, possibly multi-line text.
    pub notes: String,
    /// Rendered QR code for the entry. Regenerated on every edit and persisted
    /// as an opaque blob; it never takes part in lookups or equality.
    pub qr_image: Option<Vec<u8>>,
}

impl Entry {
    /// Build a blank registration carrying the form defaults and a fresh id.
    pub fn new(control_number: i64) -> Self {
        Self::with_id(EntryId::new(), control_number)
    }

    /// Rebuild an entry whose identity is already known. Only persistence
    /// should need this; everything else goes through [`Entry::new`].
    pub fn with_id(id: EntryId, control_number: i64) -> Self {
        Self {
            id,
            control_number,
            first_name: String::new(),
            last_name: String::new(),
            jersey_number: String::new(),
            grade: GRADES[0].to_string(),
            school: SCHOOLS[0].to_string(),
            sport: SPORTS[0].to_string(),
            team: TEAMS[0].to_string(),
            parent_first_name: String::new(),
            parent_last_name: String::new(),
            parent_phone: String::new(),
            parent_email: String::new(),
            eight_by_ten: ZERO.to_string(),
            team_photo: ZERO.to_string(),
            silver_package: ZERO.to_string(),
            digital_copy: ZERO.to_string(),
            banner: ZERO.to_string(),
            flex: ZERO.to_string(),
            frame: ZERO.to_string(),
            payment_type: "Did not pay".to_string(),
            payment_amount: ZERO.to_string(),
            notes: String::new(),
            qr_image: None,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    /// `First Last`, collapsing the gap when either half is blank.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.control_number == other.control_number
            && self.first_name == other.first_name
            && self.last_name == other.last_name
            && self.jersey_number == other.jersey_number
            && self.grade == other.grade
            && self.school == other.school
            && self.sport == other.sport
            && self.team == other.team
            && self.parent_first_name == other.parent_first_name
            && self.parent_last_name == other.parent_last_name
            && self.parent_phone == other.parent_phone
            && self.parent_email == other.parent_email
            && self.eight_by_ten == other.eight_by_ten
            && self.team_photo == other.team_photo
            && self.silver_package == other.silver_package
            && self.digital_copy == other.digital_copy
            && self.banner == other.banner
            && self.flex == other.flex
            && self.frame == other.frame
            && self.payment_type == other.payment_type
            && self.payment_amount == other.payment_amount
            && self.notes == other.notes
    }
}

impl Eq for Entry {}
