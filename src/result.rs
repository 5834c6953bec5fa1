//! Resultado de un paso/test y el agregador de resultados.
//!
//! La prioridad es fija: FAILURE/ERROR > PENDING > SUCCESS > IGNORED/SKIPPED.
//! `aggregate` es una función pura sobre conjuntos: el orden de los hijos no
//! altera el veredicto, y una secuencia vacía resuelve a `Pending`.

use serde::{Deserialize, Serialize};

/// Veredicto de un paso, grupo o test completo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestResult {
    /// Aserción fallida (desajuste esperado/observado).
    Failure,
    /// Cualquier otro fallo no controlado, normalizado a la misma categoría.
    Error,
    /// Paso declarado pendiente o test sin veredicto.
    Pending,
    Success,
    /// Omitido porque un paso anterior falló o por marca declarativa.
    Ignored,
    Skipped,
}

impl TestResult {
    /// Prioridad de agregación (menor = más dominante).
    #[inline]
    pub fn priority(self) -> u8 {
        match self {
            TestResult::Failure | TestResult::Error => 0,
            TestResult::Pending => 1,
            TestResult::Success => 2,
            TestResult::Ignored | TestResult::Skipped => 3,
        }
    }

    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, TestResult::Failure | TestResult::Error)
    }

    #[inline]
    pub fn is_pending(self) -> bool {
        matches!(self, TestResult::Pending)
    }
}

/// Reduce los resultados de los hijos a un único resultado padre.
///
/// Contrato: secuencia vacía -> `Pending`; en otro caso gana la clase de
/// mayor prioridad presente. Usable recursivamente bottom-up sobre árboles
/// de profundidad arbitraria.
pub fn aggregate<I>(results: I) -> TestResult
    where I: IntoIterator<Item = TestResult>
{
    let mut best: Option<TestResult> = None;
    for r in results {
        match best {
            None => best = Some(r),
            Some(b) if r.priority() < b.priority() => best = Some(r),
            Some(_) => {}
        }
    }
    best.unwrap_or(TestResult::Pending)
}
