//! The portal's four forms and where each one leads
use std::fmt;
use std::str::FromStr;

use super::api::endpoints;
use super::chain::{Chain, ChainStep, prior_id};
use super::form::Values;
use super::schema::{FieldDef, Schema};

pub mod company_signup;
pub mod create_course;
pub mod login;
pub mod signup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Signup,
    CompanySignup,
    CreateCourse,
}

impl Screen {
    pub const ALL: [Screen; 4] = [
        Screen::Login,
        Screen::Signup,
        Screen::CompanySignup,
        Screen::CreateCourse,
    ];

    /// Key the form's status is stored under
    pub fn form_id(&self) -> &'static str {
        match self {
            Screen::Login => "login",
            Screen::Signup => "signup",
            Screen::CompanySignup => "company_sign_up",
            Screen::CreateCourse => "create_course",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Screen::Login => "/login",
            Screen::Signup => "/signup",
            Screen::CompanySignup => "/company_sign_up",
            Screen::CreateCourse => "/create_course",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|screen| screen.path() == path)
    }

    /// Route taken after a successful submission
    pub fn destination(&self) -> &'static str {
        match self {
            Screen::Login => "/",
            Screen::Signup | Screen::CompanySignup => "/login",
            Screen::CreateCourse => "/courses",
        }
    }

    pub fn submit_label(&self, busy: bool) -> &'static str {
        match (self, busy) {
            (Screen::Login, false) => "Login",
            (Screen::Login, true) => "Logging in...",
            (Screen::Signup | Screen::CompanySignup, false) => "Sign Up",
            (Screen::Signup | Screen::CompanySignup, true) => "Signing up...",
            (Screen::CreateCourse, false) => "Create Course",
            (Screen::CreateCourse, true) => "Creating...",
        }
    }

    pub fn schema(&self) -> Schema {
        match self {
            Screen::Login => login::schema(),
            Screen::Signup => signup::schema(),
            Screen::CompanySignup => company_signup::schema(),
            Screen::CreateCourse => create_course::schema(),
        }
    }

    pub fn initial_values(&self) -> Values {
        match self {
            Screen::Login => login::initial_values(),
            Screen::Signup => signup::initial_values(),
            Screen::CompanySignup => company_signup::initial_values(),
            Screen::CreateCourse => create_course::initial_values(),
        }
    }

    pub fn chain(&self) -> Chain {
        match self {
            Screen::Login => login::chain(),
            Screen::Signup => signup::chain(),
            Screen::CompanySignup => company_signup::chain(),
            Screen::CreateCourse => create_course::chain(),
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_id())
    }
}

impl FromStr for Screen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim_start_matches('/').replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|screen| screen.form_id() == key)
            .ok_or_else(|| format!("unknown screen '{s}'"))
    }
}
