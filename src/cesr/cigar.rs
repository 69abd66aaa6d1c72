use crate::cesr::verfer::Verfer;
use crate::cesr::BaseMatter;
use crate::errors::MatterError;
use crate::Matter;

///  Cigar is Matter subclass holding a nonindexed signature with verfer property.
///  From Matter .raw is signature and .code is signature cipher suite
///  Adds .verfer property to hold Verfer instance of associated verifier public key
///  Verfer's .raw as verifier key and .code is verifier cipher suite.

pub struct Cigar {
    base: BaseMatter,
    pub verfer: Option<Verfer>,
}

impl Cigar {
    pub fn new(
        raw: Option<&[u8]>,
        code: Option<&str>,
        soft: Option<&str>,
        rize: Option<usize>,
        verfer: Option<Verfer>,
    ) -> Result<Self, MatterError> {
        Ok(Self {
            base: BaseMatter::new(raw, code, soft, rize)?,
            verfer,
        })
    }
}

impl Matter for Cigar {
    fn code(&self) -> &str { self.base.code() }
    fn raw(&self) -> &[u8] { self.base.raw() }
    fn qb64(&self) -> String { self.base.qb64() }
    fn qb2(&self) -> Vec<u8> { self.base.qb2() }
    fn is_transferable(&self) -> bool { self.base.is_transferable() }
    fn is_digestive(&self) -> bool { self.base.is_digestive() }
    fn is_prefixive(&self) -> bool { self.base.is_prefixive() }
    fn is_special(&self) -> bool { self.base.is_special() }
}
