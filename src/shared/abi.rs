//! Minimal contract ABIs used by the pipeline

use alloy::sol;

sol! {
    /// ERC-20 surface needed for approving and balance checks
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }

    /// Wrapped native token
    interface IWETH9 {
        function deposit() external payable;
    }
}
