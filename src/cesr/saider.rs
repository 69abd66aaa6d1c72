use crate::cesr::BaseMatter;
use crate::Matter;

///  Saider is Matter subclass for self-addressing identifier prefix using
///  derivation as determined by code from ked
#[derive(Clone)]
pub struct Saider {
    base: BaseMatter,
}

impl Saider {
    /// Creates a Saider from raw digest bytes and a digest code
    pub fn new(raw: Option<&[u8]>, code: Option<&str>) -> Result<Self, crate::errors::MatterError> {
        Ok(Self {
            base: BaseMatter::new(raw, code, None, None)?,
        })
    }

    /// Creates a Saider from a qb64 string
    pub fn from_qb64(qb64: &str) -> Result<Self, crate::errors::MatterError> {
        Ok(Self {
            base: BaseMatter::from_qb64(qb64)?,
        })
    }
}

impl Matter for Saider {
    fn code(&self) -> &str { self.base.code() }
    fn raw(&self) -> &[u8] { self.base.raw() }
    fn qb64(&self) -> String { self.base.qb64() }
    fn qb2(&self) -> Vec<u8> { self.base.qb2() }
    fn is_transferable(&self) -> bool { self.base.is_transferable() }
    fn is_digestive(&self) -> bool { self.base.is_digestive() }
    fn is_prefixive(&self) -> bool { self.base.is_prefixive() }
    fn is_special(&self) -> bool { self.base.is_special() }
}
