/// A named form payload to benchmark against.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    payload: Payload,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, payload: Payload) -> Self {
        Self { name, group, payload }
    }

    pub fn flat(name: &'static str, payload: Payload) -> Self {
        Self::new(name, TestGroup::Flat, payload)
    }

    pub fn nested(name: &'static str, payload: Payload) -> Self {
        Self::new(name, TestGroup::Nested, payload)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// A form-encoded payload embedded from `resources/form`.
#[derive(Debug, Copy, Clone)]
pub struct Payload {
    file_name: &'static str,
    content: &'static str,
}

impl Payload {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    /// The payload without the trailing newline of the resource file.
    pub fn content(&self) -> &'static str {
        self.content.trim_end()
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    pub fn len(&self) -> usize {
        self.content().len()
    }

    pub fn is_empty(&self) -> bool {
        self.content().is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestGroup {
    Flat,
    Nested,
}

impl TestGroup {
    pub fn label(self) -> &'static str {
        match self {
            TestGroup::Flat => "flat",
            TestGroup::Nested => "nested",
        }
    }
}
