use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Field(&'static str),
    Index(usize),
}

/// Coordinate of a media slot inside an entity tree, rendered as
/// `days[2].hotel.images[1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MediaPath(Vec<Segment>);

impl MediaPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &'static str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Field(name));
        Self(segments)
    }

    pub fn index(&self, position: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(position));
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }
}

impl fmt::Display for MediaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => write!(f, "{}", name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(position) => write!(f, "[{}]", position)?,
            }
        }
        Ok(())
    }
}
