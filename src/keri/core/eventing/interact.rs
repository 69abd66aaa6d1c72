use crate::cesr::number::Number;
use crate::cesr::Versionage;
use crate::keri::core::serdering::{SadValue, SerderKERI};
use crate::keri::{versify, Ilks, Kinds};
use indexmap::IndexMap;
use num_bigint::BigUint;
use std::error::Error;

/// Builder for creating KERI interaction events
pub struct InteractEventBuilder {
    pre: String,
    dig: String,
    sn: usize,
    data_list: Option<Vec<SadValue>>,
    data_map: Option<IndexMap<String, SadValue>>,
    version: String,
    kind: String,
}

impl InteractEventBuilder {
    /// Create a new InteractEventBuilder with required fields
    pub fn new(pre: String, dig: String) -> Self {
        Self {
            pre,
            dig,
            sn: 1,
            data_list: None,
            data_map: None,
            version: "KERI10JSON000000_".to_string(),
            kind: "JSON".to_string(),
        }
    }

    /// Set the sequence number
    pub fn with_sn(mut self, sn: usize) -> Self {
        self.sn = sn;
        self
    }

    /// Set the committed data (such as seals)
    pub fn with_data_list(mut self, data: Vec<SadValue>) -> Self {
        self.data_list = Some(data);
        self
    }

    /// Set the committed data (such as seals)
    pub fn with_data_map(mut self, data: IndexMap<String, SadValue>) -> Self {
        self.data_map = Some(data);
        self
    }

    /// Set the version string
    pub fn with_version(mut self, version: String) -> Self {
        self.version = version;
        self
    }

    /// Set the serialization kind
    pub fn with_kind(mut self, kind: String) -> Self {
        self.kind = kind;
        self
    }

    /// Build the interaction event serder
    pub fn build(self) -> Result<SerderKERI, Box<dyn Error>> {
        // Validate sequence number
        let sner = Number::from_num(&BigUint::from(self.sn))?;
        if sner.num() < 1 {
            return Err(format!("Invalid sn = 0x{} for ixn.", sner.numh()).into());
        }

        if !Kinds::contains(&self.kind) {
            return Err(format!("Invalid kind = {} for ixn.", self.kind).into());
        }
        // Create versified string
        let vs = versify("KERI", &Versionage::from(self.version), &self.kind, 0)?;

        // Create the key event dict (ked)
        let mut ked = IndexMap::new();
        ked.insert("v".to_string(), SadValue::String(vs));
        ked.insert("t".to_string(), SadValue::String(Ilks::IXN.to_string()));
        ked.insert("d".to_string(), SadValue::String("".to_string()));
        ked.insert("i".to_string(), SadValue::String(self.pre));
        ked.insert("s".to_string(), SadValue::String(sner.numh()));
        ked.insert("p".to_string(), SadValue::String(self.dig));

        if self.data_list.is_some() {
            ked.insert("a".to_string(), SadValue::Array(self.data_list.unwrap()));
        } else if self.data_map.is_some() {
            ked.insert("a".to_string(), SadValue::Object(self.data_map.unwrap()));
        } else {
            ked.insert("a".to_string(), SadValue::Array(vec![]));
        }

        // Create the serder
        let serder = SerderKERI::from_sad_and_saids(&ked, None)?;
        Ok(serder)
    }
}
