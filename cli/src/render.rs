use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use mykad::MyKadProfile;
use serde::Serialize;

const DATE_FORMAT: &str = "%d %b %Y";
const PHOTO_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Output<'a> {
    #[serde(rename = "IC")]
    ic: &'a str,
    name: &'a str,
    sex: String,
    #[serde(rename = "OldIC")]
    old_ic: &'a str,
    birth_date: String,
    birth_place: &'a str,
    issue_date: String,
    citizenship: &'a str,
    race: &'a str,
    religion: &'a str,
    address1: &'a str,
    address2: &'a str,
    address3: &'a str,
    postcode: String,
    city: &'a str,
    state: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_data_url: Option<String>,
}

impl<'a> Output<'a> {
    fn new(profile: &'a MyKadProfile) -> Self {
        let [address1, address2, address3] = &profile.address;

        Self {
            ic: &profile.ic,
            name: &profile.name,
            sex: profile.sex.to_string(),
            old_ic: &profile.old_ic,
            birth_date: format_date(&profile.birth_date),
            birth_place: &profile.birth_place,
            issue_date: format_date(&profile.issue_date),
            citizenship: &profile.citizenship,
            race: &profile.race,
            religion: &profile.religion,
            address1,
            address2,
            address3,
            postcode: profile.postcode.to_string(),
            city: &profile.city,
            state: &profile.state,
            photo_data_url: None,
        }
    }

    fn lines(&self) -> [(&'static str, &str); 16] {
        [
            ("IC", self.ic),
            ("Name", self.name),
            ("Sex", self.sex.as_str()),
            ("OldIC", self.old_ic),
            ("BirthDate", self.birth_date.as_str()),
            ("BirthPlace", self.birth_place),
            ("IssueDate", self.issue_date.as_str()),
            ("Citizenship", self.citizenship),
            ("Race", self.race),
            ("Religion", self.religion),
            ("Address1", self.address1),
            ("Address2", self.address2),
            ("Address3", self.address3),
            ("Postcode", self.postcode.as_str()),
            ("City", self.city),
            ("State", self.state),
        ]
    }
}

/// Writes the profile as `Key: Value` lines.
pub fn text<W: Write>(w: &mut W, profile: &MyKadProfile) -> io::Result<()> {
    writeln!(w, "MyKad Read Success")?;

    for (key, value) in Output::new(profile).lines() {
        writeln!(w, "{}: {}", key, value)?;
    }

    writeln!(w, "PhotoLength: {}", profile.photo_len())
}

/// Writes the profile as a JSON object, embedding the photo as a data URL.
pub fn json<W: Write>(w: &mut W, profile: &MyKadProfile) -> io::Result<()> {
    let output = Output {
        photo_data_url: Some(format!(
            "{}{}",
            PHOTO_DATA_URL_PREFIX,
            STANDARD.encode(&profile.photo)
        )),
        ..Output::new(profile)
    };

    serde_json::to_writer(&mut *w, &output)?;
    writeln!(w)
}
