use std::borrow::Cow;

/// A translation key plus named arguments.
///
/// Arguments are stringified at the call site; how they are placed in the
/// final text is a catalog concern (`{name}` placeholders).
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: Cow<'static, str>,
    pub args: Vec<(Cow<'static, str>, String)>,
}

impl Message {
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: id.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<Cow<'static, str>>, value: impl ToString) -> Self {
        self.args.push((name.into(), value.to_string()));
        self
    }
}

/// A UI label: either raw text or a translatable message key.
#[derive(Clone, Debug, PartialEq)]
pub enum Label {
    Raw(String),
    Msg(Message),
}

impl Label {
    pub fn raw(s: impl Into<String>) -> Self {
        Self::Raw(s.into())
    }

    pub fn msg(m: Message) -> Self {
        Self::Msg(m)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self::Raw(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self::Raw(s.to_string())
    }
}

impl From<&String> for Label {
    fn from(s: &String) -> Self {
        Self::Raw(s.clone())
    }
}

impl From<Message> for Label {
    fn from(m: Message) -> Self {
        Self::Msg(m)
    }
}
