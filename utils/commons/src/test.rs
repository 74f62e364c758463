//! Reusable mock entrypoints for testing contract invocations against
//! `test_infrastructure::TestHost`.
use concordium_std::test_infrastructure::MockFn;
use concordium_std::*;

/// Mock entrypoint that parses its parameter as `D` and responds with
/// `return_value`.
pub fn parse_and_ok_mock<D: Deserial, S>(
    return_value: impl Clone + Serial + 'static,
) -> MockFn<S> {
    MockFn::new_v1(move |parameter, _amount, _balance, _state| {
        D::deserial(&mut Cursor::new(parameter.as_ref())).map_err(|_| CallContractError::Trap)?;
        Ok((false, return_value.clone()))
    })
}

/// Mock entrypoint that parses its parameter as `D`, traps unless `check`
/// holds for it, and responds with `return_value`.
pub fn parse_and_check_mock<D: Deserial, S>(
    check: impl Fn(&D) -> bool + 'static,
    return_value: impl Clone + Serial + 'static,
) -> MockFn<S> {
    MockFn::new_v1(move |parameter, _, _, _state| {
        let value =
            D::deserial(&mut Cursor::new(parameter.as_ref())).map_err(|_| CallContractError::Trap)?;
        if !check(&value) {
            return Err(CallContractError::Trap);
        };
        Ok((false, return_value.clone()))
    })
}

/// Mock entrypoint that parses its parameter as `D` and responds with `f`
/// applied to it, trapping when `f` returns `None`.
pub fn parse_and_map_mock<D: Deserial, T: Serial, S>(
    f: impl Fn(&D) -> Option<T> + 'static,
) -> MockFn<S> {
    MockFn::new_v1(move |parameter, _, _, _state| {
        let value =
            D::deserial(&mut Cursor::new(parameter.as_ref())).map_err(|_| CallContractError::Trap)?;
        f(&value)
            .map(|r| (false, r))
            .ok_or(CallContractError::Trap)
    })
}

/// Mock entrypoint that rejects every call with the given reason.
pub fn logic_reject_mock<S>(reason: i32) -> MockFn<S> {
    MockFn::new_v1(move |_parameter, _, _, _state| -> Result<(bool, ()), _> {
        Err(CallContractError::LogicReject {
            reason,
            return_value: (),
        })
    })
}
