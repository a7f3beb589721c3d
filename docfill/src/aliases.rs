//! Canonical identity-card fields and the header alias table used to
//! recognise them in scanner output, mobile payloads and form labels.

use std::{collections::HashMap, fmt::Display};

use lazy_static::lazy_static;

/// The seven fields a citizen ID scan yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Cccd,
    Cmnd,
    FullName,
    DateOfBirth,
    Gender,
    Address,
    IssueDate,
}

impl CanonicalField {
    /// Order of the legacy positional formats:
    /// `CCCD|CMND|Họ tên|Ngày sinh|Giới tính|Địa chỉ|Ngày cấp`.
    pub const POSITIONAL: [CanonicalField; 7] = [
        CanonicalField::Cccd,
        CanonicalField::Cmnd,
        CanonicalField::FullName,
        CanonicalField::DateOfBirth,
        CanonicalField::Gender,
        CanonicalField::Address,
        CanonicalField::IssueDate,
    ];

    /// Key used in parsed records.
    pub fn key(&self) -> &'static str {
        match self {
            CanonicalField::Cccd => "cccd",
            CanonicalField::Cmnd => "cmnd",
            CanonicalField::FullName => "hoTen",
            CanonicalField::DateOfBirth => "ngaySinh",
            CanonicalField::Gender => "gioiTinh",
            CanonicalField::Address => "diaChi",
            CanonicalField::IssueDate => "ngayCap",
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, CanonicalField::DateOfBirth | CanonicalField::IssueDate)
    }
}

impl Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

lazy_static! {
    static ref HEADER_ALIASES: HashMap<&'static str, CanonicalField> = {
        use CanonicalField::*;
        let table: &[(CanonicalField, &[&str])] = &[
            (
                Cccd,
                &[
                    "cccd",
                    "so_cccd",
                    "can_cuoc_cong_dan",
                    "so_can_cuoc",
                    "so_can_cuoc_cong_dan",
                    "so_cmnd_hoac_can_cuoc_cong_dan",
                    "so_dinh_danh",
                    "so_dinh_danh_ca_nhan",
                    "id_number",
                ],
            ),
            (
                Cmnd,
                &[
                    "cmnd",
                    "so_cmnd",
                    "chung_minh_nhan_dan",
                    "so_chung_minh",
                    "so_chung_minh_nhan_dan",
                ],
            ),
            (
                FullName,
                &[
                    "ho_ten",
                    "hoten",
                    "ho_va_ten",
                    "ho_chu_dem_ten",
                    "ho",
                    "ten",
                    "full_name",
                    "fullname",
                    "name",
                ],
            ),
            (
                DateOfBirth,
                &[
                    "ngay_sinh",
                    "ngaysinh",
                    "sinh_ngay",
                    "ngay_thang_nam_sinh",
                    "nam_sinh",
                    "dob",
                    "date_of_birth",
                ],
            ),
            (
                Gender,
                &["gioi_tinh", "gioitinh", "phai", "nam_nu", "gender", "sex"],
            ),
            (
                Address,
                &[
                    "dia_chi",
                    "diachi",
                    "noi_cu_tru",
                    "noicutru",
                    "dia_chi_cu_tru",
                    "cho_o_hien_tai",
                    "noi_thuong_tru",
                    "address",
                ],
            ),
            (
                IssueDate,
                &[
                    "ngay_cap",
                    "ngaycap",
                    "cap_ngay",
                    "ngay_cap_cccd",
                    "ngay_cap_can_cuoc",
                    "issue_date",
                ],
            ),
        ];

        let mut map = HashMap::new();
        for (field, aliases) in table {
            for alias in *aliases {
                map.insert(*alias, *field);
            }
        }
        map
    };
}

/// Maps a header token (any casing, with or without Vietnamese diacritics) to its field.
///
/// # Example
/// ```rust
/// use docfill::aliases::{CanonicalField, canonical_for_header};
/// assert_eq!(canonical_for_header("Số CCCD"), Some(CanonicalField::Cccd));
/// assert_eq!(canonical_for_header("Ngày, tháng, năm sinh"), Some(CanonicalField::DateOfBirth));
/// assert_eq!(canonical_for_header("hoTen"), Some(CanonicalField::FullName));
/// assert_eq!(canonical_for_header("ghi chú"), None);
/// ```
pub fn canonical_for_header(token: &str) -> Option<CanonicalField> {
    HEADER_ALIASES
        .get(normalize_header_token(token).as_str())
        .copied()
}

/// Lower-cases, folds diacritics and collapses every run of separators to a single `_`.
pub fn normalize_header_token(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut pending_sep = false;
    for ch in token.trim().chars().flat_map(char::to_lowercase) {
        let ch = fold_vietnamese(ch);
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Strips Vietnamese tone and vowel marks from a lower-case letter.
pub fn fold_vietnamese(ch: char) -> char {
    const FOLDS: [(char, &str); 7] = [
        ('a', "àáạảãâầấậẩẫăằắặẳẵ"),
        ('e', "èéẹẻẽêềếệểễ"),
        ('i', "ìíịỉĩ"),
        ('o', "òóọỏõôồốộổỗơờớợởỡ"),
        ('u', "ùúụủũưừứựửữ"),
        ('y', "ỳýỵỷỹ"),
        ('d', "đ"),
    ];
    if ch.is_ascii() {
        return ch;
    }
    FOLDS
        .iter()
        .find(|(_, marked)| marked.contains(ch))
        .map(|(base, _)| *base)
        .unwrap_or(ch)
}

/// Folds a whole string; handy for diacritic-insensitive comparisons.
pub fn fold_text(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(fold_vietnamese)
        .collect()
}
