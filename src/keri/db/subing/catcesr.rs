use crate::cesr::dater::Dater;
use crate::cesr::diger::Diger;
use crate::cesr::indexing::siger::Siger;
use crate::cesr::seqner::Seqner;
use crate::cesr::{BaseMatter, Parsable};
use crate::keri::db::dbing::LMDBer;
use crate::keri::db::subing::cesr::CesrSuberBase;
use crate::keri::db::subing::{Suber, SuberError};
use crate::Matter;
use std::any::Any;
use std::sync::Arc;

pub struct CatCesrSuberBase<'db, M: Matter> {
    pub base: CesrSuberBase<'db, M>,
    pub formats: Vec<String>,
}

impl<'db, M: Matter + Parsable> CatCesrSuberBase<'db, M> {
    /// Creates a new CatCesrSuberBase
    ///
    /// Parameters:
    ///   - db: The base LMDB database
    ///   - subkey: The key for the sub-database
    ///   - formats: Array of format strings that determine which serialization/deserialization methods to use
    ///   - sep: Optional separator for keys
    ///   - verify: Whether to verify data when deserializing
    pub fn new(
        db: Arc<&'db LMDBer>,
        subkey: &str,
        formats: Vec<String>,
        sep: Option<u8>,
        verify: bool,
    ) -> Result<Self, SuberError> {
        let base = CesrSuberBase::new(db, subkey, sep, verify)?;

        Ok(Self { base, formats })
    }

    /// Generic serialization dispatch method that handles any Matter type
    /// but with specific logic for the supported format types
    pub fn ser(&self, val: &[&dyn Matter]) -> Result<Vec<u8>, SuberError> {
        match self.formats.as_slice() {
            // Handle dater, seqner, diger format
            [a, b, c] if a == "dater" && b == "seqner" && c == "diger" => {
                // Validate we have exactly 3 values
                if val.len() != 3 {
                    return Err(SuberError::ValueConversionError(
                        "Expected 3 values for dater, seqner, diger format".to_string(),
                    ));
                }

                self.ser_from_dater_seqner_diger(val[0], val[1], val[2])
            }

            // Handle siger format
            [a] if a == "siger" => {
                // Validate we have exactly 1 value
                if val.len() != 1 {
                    return Err(SuberError::ValueConversionError(
                        "Expected 1 value for siger format".to_string(),
                    ));
                }

                let siger = match val[0].as_any().downcast_ref::<Siger>() {
                    Some(s) => s,
                    None => {
                        return Err(SuberError::ValueConversionError(
                            "Value must be a Siger".to_string(),
                        ))
                    }
                };

                self.ser_from_siger(siger)
            }

            // Default case - handle any Matter object
            _ => {
                // Serialize directly using qb64b
                Ok(val[0].qb64b())
            }
        }
    }

    /// Generic deserialization dispatch method that handles any Matter type
    /// but with specific logic for the supported format types
    pub fn des(&self, val: &[u8]) -> Result<Vec<Box<dyn Matter>>, SuberError> {
        match self.formats.as_slice() {
            // Handle dater, seqner, diger format
            [a, b, c] if a == "dater" && b == "seqner" && c == "diger" => {
                self.des_to_dater_seqner_diger(val)
            }

            // Handle siger format
            [a] if a == "siger" => self.des_to_siger(val),

            // Default case - handle any Matter using BaseMatter
            _ => {
                // For generic format, deserialize as BaseMatter
                let matter = BaseMatter::from_qb64b(&mut val.to_vec(), None)
                    .map_err(|e| SuberError::MatterError(e))?;

                // Return as a boxed Matter trait object
                let boxed: Box<dyn Matter> = Box::new(matter);
                Ok(vec![boxed])
            }
        }
    }

    /// Serializes from a Siger to bytes
    pub fn ser_from_siger(&self, siger: &Siger) -> Result<Vec<u8>, SuberError> {
        Ok(siger.qb64b())
    }

    /// Deserializes from bytes to a Siger
    pub fn des_to_siger(&self, val: &[u8]) -> Result<Vec<Box<dyn Matter>>, SuberError> {
        // Convert val to a mutable vector so we can use from_qb64b
        let mut data = val.to_vec();

        // Parse the Siger
        let siger = Siger::from_qb64b(&mut data, Some(true)).map_err(|e| {
            SuberError::DeserializationError(format!("Failed to parse Siger: {}", e))
        })?;

        // Return as a vector of boxed Matter traits
        let result: Vec<Box<dyn Matter>> = vec![Box::new(siger)];

        Ok(result)
    }

    /// Serializes from a tuple of (Dater, Seqner, Diger) to bytes
    pub fn ser_from_dater_seqner_diger(
        &self,
        dater: &dyn Matter,
        seqner: &dyn Matter,
        diger: &dyn Matter,
    ) -> Result<Vec<u8>, SuberError> {
        // Concatenate the qb64b of each instance
        let mut result = Vec::new();
        result.extend_from_slice(&dater.qb64b());
        result.extend_from_slice(&seqner.qb64b());
        result.extend_from_slice(&diger.qb64b());

        Ok(result)
    }

    /// Deserializes from bytes to a tuple of (Dater, Seqner, Diger)
    pub fn des_to_dater_seqner_diger(
        &self,
        val: &[u8],
    ) -> Result<Vec<Box<dyn Matter>>, SuberError> {
        // Convert val to a mutable vector so we can use from_qb64b
        let mut data = val.to_vec();

        // Parse the Dater
        let dater = Dater::from_qb64b(&mut data, Some(true)).map_err(|e| {
            SuberError::DeserializationError(format!("Failed to parse Dater: {}", e))
        })?;

        // Parse the Seqner
        let seqner = Seqner::from_qb64b(&mut data, Some(true)).map_err(|e| {
            SuberError::DeserializationError(format!("Failed to parse Seqner: {}", e))
        })?;

        // Parse the Diger
        let diger = Diger::from_qb64b(&mut data, Some(true)).map_err(|e| {
            SuberError::DeserializationError(format!("Failed to parse Diger: {}", e))
        })?;

        let result: Vec<Box<dyn Matter>> = vec![Box::new(dater), Box::new(seqner), Box::new(diger)];

        Ok(result)
    }
}

/// CatCesrSuber is a wrapper around CatCesrSuberBase that provides the complete Suber interface

pub struct CatCesrSuber<'db, M: Matter> {
    pub base: CatCesrSuberBase<'db, M>,
    pub suber: Suber<'db>,
}

impl<'db, M: Matter + Parsable> CatCesrSuber<'db, M> {
    /// Creates a new CatCesrSuber
    ///
    /// Parameters:
    ///   - db: The base LMDB database
    ///   - subkey: The key for the sub-database
    ///   - formats: Array of format strings that determine which serialization/deserialization methods to use
    ///   - sep: Optional separator for keys
    ///   - verify: Whether to verify data when deserializing
    pub fn new(
        db: Arc<&'db LMDBer>,
        subkey: &str,
        formats: Vec<String>,
        sep: Option<u8>,
        verify: bool,
    ) -> Result<Self, SuberError> {
        let base = CatCesrSuberBase::new(db.clone(), subkey, formats, sep, verify)?;
        let suber = Suber::new(db, subkey, sep, verify)?;

        Ok(Self { base, suber })
    }

    // Delegate to the suber.put method
    pub fn put<K: AsRef<[u8]>>(
        &self,
        keys: &[K],
        vals: &[&dyn Matter],
    ) -> Result<bool, SuberError> {
        // Serialize Matter values to Vec<u8> using base.ser
        let val_bytes = self.base.ser(vals)?;
        // Then delegate to suber.put
        self.suber.put(keys, &val_bytes)
    }

    // Delegate to the suber.pin method
    pub fn pin<K: AsRef<[u8]>>(
        &self,
        keys: &[K],
        vals: &[&dyn Matter],
    ) -> Result<bool, SuberError> {
        // Serialize Matter values to Vec<u8> using base.ser
        let val_bytes = self.base.ser(vals)?;
        // Then delegate to suber.pin
        self.suber.pin(keys, &val_bytes)
    }

    // Delegate to the suber.get method
    pub fn get<K: AsRef<[u8]>>(
        &self,
        keys: &[K],
    ) -> Result<Option<Vec<Box<dyn Matter>>>, SuberError> {
        // Get the value as Vec<u8> from suber
        let val_opt = self.suber.get::<K, Vec<u8>>(keys)?;

        // If value exists, deserialize it to Vec<Box<dyn Matter>>
        match val_opt {
            Some(val_bytes) => {
                let deserialized = self.base.des(&val_bytes)?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// Removes a value from the database
    pub fn rem<K: AsRef<[u8]>>(&self, keys: &[K]) -> Result<bool, SuberError> {
        self.suber.rem(keys)
    }

    /// Trims keys in the database
    pub fn trim<K: AsRef<[u8]>>(&self, keys: &[K], topive: bool) -> Result<bool, SuberError> {
        self.suber.trim(keys, topive)
    }

    /// Gets all items for a set of keys
    pub fn get_full_item_iter<K: AsRef<[u8]>>(
        &self,
        keys: &[K],
        topive: bool,
    ) -> Result<Vec<(Vec<Vec<u8>>, Vec<u8>)>, SuberError> {
        self.suber.base.get_full_item_iter(keys, topive)
    }

    /// Gets filtered items for a set of keys
    pub fn get_item_iter<K: AsRef<[u8]>>(
        &self,
        keys: &[K],
        topive: bool,
    ) -> Result<Vec<(Vec<Vec<u8>>, Vec<u8>)>, SuberError> {
        self.suber.base.get_item_iter(keys, topive)
    }

    /// Process raw items into deserialized values
    pub fn process_items(
        &self,
        items: Vec<(Vec<Vec<u8>>, Vec<u8>)>,
    ) -> Result<Vec<(Vec<Vec<u8>>, Vec<Box<dyn Matter>>)>, SuberError> {
        let mut result = Vec::new();

        for (keys, val) in items {
            let deserialized = self.base.des(&val)?;
            result.push((keys, deserialized));
        }

        Ok(result)
    }
    /// Delegate to the suber.base.to_key method
    pub fn to_key<K: AsRef<[u8]>>(&self, keys: &[K], topive: bool) -> Vec<u8> {
        self.suber.base.to_key(keys, topive)
    }

    /// Delegate to the suber.base.to_keys method
    pub fn to_keys(&self, key: &[u8]) -> Vec<Vec<u8>> {
        self.suber.base.to_keys(key)
    }

    /// Counts all items in the database
    pub fn cnt_all(&self) -> Result<usize, SuberError> {
        self.suber.cnt_all()
    }
}
